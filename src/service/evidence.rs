use std::path::PathBuf;

use actix_web::web;
use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::error::{AttendanceError, StoreError};

/// URL segment (and stored path prefix) under which evidence files are served.
pub const EVIDENCE_URL_SEGMENT: &str = "uploads";

/// An uploaded check-in selfie.
#[derive(Debug, Clone)]
pub struct EvidenceUpload {
    pub bytes: Vec<u8>,
    pub extension: &'static str,
}

impl EvidenceUpload {
    /// Validates the part's content type and size.
    pub fn new(
        bytes: Vec<u8>,
        content_type: Option<&str>,
        max_bytes: usize,
    ) -> Result<Self, AttendanceError> {
        if bytes.is_empty() {
            return Err(AttendanceError::validation("Selfie image is required"));
        }
        if bytes.len() > max_bytes {
            return Err(AttendanceError::validation(format!(
                "Image exceeds the {max_bytes} byte limit"
            )));
        }

        let extension = match content_type {
            None | Some("image/jpeg") | Some("image/jpg") => "jpg",
            Some("image/png") => "png",
            Some("image/webp") => "webp",
            Some(other) if other.starts_with("image/") => "jpg",
            Some(_) => return Err(AttendanceError::validation("Only image uploads are allowed")),
        };

        Ok(Self { bytes, extension })
    }
}

/// Durable storage for evidence blobs.
#[async_trait]
pub trait EvidenceStore: Send + Sync {
    /// Stores the blob and returns its server-relative path.
    async fn save(&self, upload: EvidenceUpload) -> Result<String, StoreError>;

    async fn discard(&self, path: &str) -> Result<(), StoreError>;
}

/// Writes evidence into a local directory served under `/uploads`.
pub struct LocalEvidenceStore {
    root: PathBuf,
}

impl LocalEvidenceStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn file_for(&self, path: &str) -> Option<PathBuf> {
        let name = path.strip_prefix(EVIDENCE_URL_SEGMENT)?.trim_start_matches('/');
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return None;
        }
        Some(self.root.join(name))
    }
}

#[async_trait]
impl EvidenceStore for LocalEvidenceStore {
    async fn save(&self, upload: EvidenceUpload) -> Result<String, StoreError> {
        let file_name = format!("{}.{}", Uuid::new_v4(), upload.extension);
        let root = self.root.clone();
        let target = root.join(&file_name);

        web::block(move || {
            std::fs::create_dir_all(&root)?;
            std::fs::write(&target, &upload.bytes)
        })
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?
        .map_err(|e| StoreError::Backend(format!("failed to write evidence: {e}")))?;

        debug!(file = %file_name, "Evidence stored");
        Ok(format!("{EVIDENCE_URL_SEGMENT}/{file_name}"))
    }

    async fn discard(&self, path: &str) -> Result<(), StoreError> {
        let Some(file) = self.file_for(path) else {
            return Err(StoreError::Backend(format!("not an evidence path: {path}")));
        };

        web::block(move || std::fs::remove_file(file))
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?
            .map_err(|e| StoreError::Backend(format!("failed to remove evidence: {e}")))
    }
}

/// Maps stored evidence paths to URLs clients can fetch.
#[derive(Clone, Debug)]
pub struct EvidenceResolver {
    base_url: String,
}

impl EvidenceResolver {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// `None` for a missing or blank path; the caller renders a placeholder.
    pub fn resolve(&self, evidence_path: Option<&str>) -> Option<String> {
        let path = evidence_path?.trim();
        if path.is_empty() {
            return None;
        }

        let normalized = path.replace('\\', "/");
        let relative = normalized.trim_start_matches("./").trim_start_matches('/');
        Some(format!("{}/{}", self.base_url, relative))
    }
}
