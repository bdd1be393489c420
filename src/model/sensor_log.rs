use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A single temperature/humidity/light sample pushed by a device.
///
/// The wire names follow the device firmware (`suhu`, `kelembaban`, `cahaya`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct SensorLog {
    pub id: u64,
    #[serde(rename = "suhu")]
    #[schema(example = 28.5)]
    pub temperature: f64,
    #[serde(rename = "kelembaban")]
    #[schema(example = 71.0)]
    pub humidity: f64,
    #[serde(rename = "cahaya")]
    #[schema(example = 512)]
    pub light: i32,
    #[schema(example = "2026-01-05T08:01:12", format = "date-time", value_type = String)]
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewSensorLog {
    pub temperature: f64,
    pub humidity: f64,
    pub light: i32,
}
