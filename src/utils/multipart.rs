use actix_multipart::Multipart;
use futures_util::TryStreamExt;

use crate::error::AttendanceError;

/// Text fields are small; anything larger is rejected.
const MAX_TEXT_FIELD_BYTES: usize = 256;

/// Raw parts of the check-in form.
#[derive(Debug, Default)]
pub struct CheckInParts {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub image: Option<Vec<u8>>,
    pub image_content_type: Option<String>,
}

/// Drains the multipart stream, keeping `latitude`, `longitude` and `image`.
///
/// Unknown fields are drained and dropped without a size limit. The image is
/// capped at `max_image_bytes`.
pub async fn read_check_in_form(
    mut payload: Multipart,
    max_image_bytes: usize,
) -> Result<CheckInParts, AttendanceError> {
    let mut parts = CheckInParts::default();

    while let Some(mut field) = payload.try_next().await.map_err(malformed)? {
        let name = field.name().to_owned();
        let limit = match name.as_str() {
            "image" => max_image_bytes,
            "latitude" | "longitude" => MAX_TEXT_FIELD_BYTES,
            _ => {
                while field.try_next().await.map_err(malformed)?.is_some() {}
                continue;
            }
        };

        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(malformed)? {
            if bytes.len() + chunk.len() > limit {
                return Err(AttendanceError::validation(format!(
                    "Field '{name}' exceeds the {limit} byte limit"
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        match name.as_str() {
            "latitude" => parts.latitude = Some(text(bytes, &name)?),
            "longitude" => parts.longitude = Some(text(bytes, &name)?),
            "image" => {
                parts.image_content_type = field.content_type().map(|m| m.essence_str().to_owned());
                parts.image = Some(bytes);
            }
            _ => {}
        }
    }

    Ok(parts)
}

fn text(bytes: Vec<u8>, name: &str) -> Result<String, AttendanceError> {
    String::from_utf8(bytes)
        .map_err(|_| AttendanceError::validation(format!("Field '{name}' is not valid text")))
}

fn malformed(e: actix_multipart::MultipartError) -> AttendanceError {
    AttendanceError::validation(format!("Malformed multipart body: {e}"))
}
