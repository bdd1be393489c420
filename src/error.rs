use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;
use tracing::error;

/// Failures surfaced by the attendance, report and sensor services.
#[derive(Debug, Display, PartialEq)]
pub enum AttendanceError {
    #[display(fmt = "{}", _0)]
    Validation(String),

    #[display(fmt = "Already checked in today")]
    AlreadyCheckedIn,

    #[display(fmt = "No open attendance session found")]
    NoOpenSession,

    #[display(fmt = "Attendance record not found")]
    NotFound,

    #[display(fmt = "{}", _0)]
    Forbidden(String),

    #[display(fmt = "storage failure: {}", _0)]
    Storage(String),
}

impl std::error::Error for AttendanceError {}

impl AttendanceError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Errors reported by the persistence layer.
#[derive(Debug, Display, PartialEq)]
pub enum StoreError {
    /// The user already holds an open session for that day.
    #[display(fmt = "open attendance session already exists")]
    OpenSessionExists,

    #[display(fmt = "{}", _0)]
    Backend(String),
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return StoreError::OpenSessionExists;
            }
        }
        StoreError::Backend(e.to_string())
    }
}

impl From<StoreError> for AttendanceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::OpenSessionExists => AttendanceError::AlreadyCheckedIn,
            StoreError::Backend(msg) => AttendanceError::Storage(msg),
        }
    }
}

impl ResponseError for AttendanceError {
    fn status_code(&self) -> StatusCode {
        match self {
            AttendanceError::Validation(_) => StatusCode::BAD_REQUEST,
            AttendanceError::AlreadyCheckedIn | AttendanceError::NoOpenSession => {
                StatusCode::CONFLICT
            }
            AttendanceError::NotFound => StatusCode::NOT_FOUND,
            AttendanceError::Forbidden(_) => StatusCode::FORBIDDEN,
            AttendanceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AttendanceError::Storage(detail) => {
                error!(error = %detail, "Storage failure");
                "Something went wrong, Contact with system admin".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(json!({
            "status": "error",
            "message": message
        }))
    }
}
