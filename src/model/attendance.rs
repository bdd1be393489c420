use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AttendanceError;

/// One user's attendance for one day.
///
/// `check_out == None` means the session is still open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "user_id": 42,
    "work_date": "2026-01-05",
    "check_in": "2026-01-05T08:01:12",
    "check_out": null,
    "latitude": -6.2,
    "longitude": 106.8,
    "evidence_path": "uploads/5f0c6d3e-2b1a-4b7e-9a57-3c1d2e0f9a11.jpg"
}))]
pub struct AttendanceRecord {
    pub id: u64,
    pub user_id: u64,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub work_date: NaiveDate,
    #[schema(example = "2026-01-05T08:01:12", format = "date-time", value_type = String)]
    pub check_in: NaiveDateTime,
    #[schema(format = "date-time", value_type = Option<String>, nullable = true)]
    pub check_out: Option<NaiveDateTime>,
    pub latitude: f64,
    pub longitude: f64,
    pub evidence_path: String,
}

impl AttendanceRecord {
    pub fn is_open(&self) -> bool {
        self.check_out.is_none()
    }
}

/// Values for a record created by check-in.
#[derive(Debug, Clone)]
pub struct NewAttendance {
    pub user_id: u64,
    pub work_date: NaiveDate,
    pub check_in: NaiveDateTime,
    pub coordinates: Coordinates,
    pub evidence_path: String,
}

/// Attendance row joined with the owning user's display name.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct AttendanceReportRow {
    pub id: u64,
    pub user_id: u64,
    pub user_name: String,
    pub work_date: NaiveDate,
    pub check_in: NaiveDateTime,
    pub check_out: Option<NaiveDateTime>,
    pub latitude: f64,
    pub longitude: f64,
    pub evidence_path: Option<String>,
}

/// A validated latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, AttendanceError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(AttendanceError::validation(
                "latitude must be a number between -90 and 90",
            ));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(AttendanceError::validation(
                "longitude must be a number between -180 and 180",
            ));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Parses the raw multipart text fields.
    pub fn parse(latitude: Option<&str>, longitude: Option<&str>) -> Result<Self, AttendanceError> {
        let (Some(lat), Some(lng)) = (latitude, longitude) else {
            return Err(AttendanceError::validation("Location is required"));
        };
        let lat = lat
            .trim()
            .parse::<f64>()
            .map_err(|_| AttendanceError::validation("latitude is not a number"))?;
        let lng = lng
            .trim()
            .parse::<f64>()
            .map_err(|_| AttendanceError::validation("longitude is not a number"))?;
        Self::new(lat, lng)
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}
