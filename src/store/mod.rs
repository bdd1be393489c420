use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

use crate::error::StoreError;
use crate::model::attendance::{AttendanceRecord, AttendanceReportRow, NewAttendance};
use crate::model::sensor_log::{NewSensorLog, SensorLog};

#[cfg(test)]
pub mod memory;
pub mod mysql;

/// Persistence for attendance rows.
#[async_trait]
pub trait AttendanceStore: Send + Sync {
    /// Open record of `user_id` for `day`, if any.
    async fn find_open_for_day(
        &self,
        user_id: u64,
        day: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, StoreError>;

    /// Inserts an open record. Must fail with [`StoreError::OpenSessionExists`]
    /// when another open record for the same user and day exists, atomically
    /// with the insert.
    async fn insert_open(&self, new: NewAttendance) -> Result<AttendanceRecord, StoreError>;

    /// Closes the most recent open record of `user_id` (by `check_in`, then
    /// `id`, descending). The stored check-out is never earlier than the
    /// check-in. Returns `None` when the user has no open record.
    async fn close_latest_open(
        &self,
        user_id: u64,
        at: NaiveDateTime,
    ) -> Result<Option<AttendanceRecord>, StoreError>;

    /// Records joined with their owner's name, most recent check-in first.
    async fn list_with_users(
        &self,
        name_filter: Option<&str>,
        limit: u32,
    ) -> Result<Vec<AttendanceReportRow>, StoreError>;

    /// Returns `false` when no record had that id.
    async fn delete(&self, id: u64) -> Result<bool, StoreError>;
}

/// Persistence for device sensor samples.
#[async_trait]
pub trait SensorStore: Send + Sync {
    async fn insert(&self, sample: NewSensorLog) -> Result<SensorLog, StoreError>;

    /// The newest `limit` samples, returned oldest first.
    async fn latest(&self, limit: u32) -> Result<Vec<SensorLog>, StoreError>;
}
