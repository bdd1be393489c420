//! In-memory stores used by the unit and HTTP tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

use super::{AttendanceStore, SensorStore};
use crate::error::StoreError;
use crate::model::attendance::{AttendanceRecord, AttendanceReportRow, NewAttendance};
use crate::model::sensor_log::{NewSensorLog, SensorLog};

#[derive(Default)]
struct AttendanceTable {
    next_id: u64,
    records: Vec<AttendanceRecord>,
    users: HashMap<u64, String>,
}

#[derive(Default)]
pub struct InMemoryAttendanceStore {
    table: Mutex<AttendanceTable>,
}

impl InMemoryAttendanceStore {
    pub fn with_users(users: &[(u64, &str)]) -> Self {
        let store = Self::default();
        {
            let mut table = store.table.lock().unwrap();
            for (id, name) in users {
                table.users.insert(*id, name.to_string());
            }
        }
        store
    }

    pub fn records(&self) -> Vec<AttendanceRecord> {
        self.table.lock().unwrap().records.clone()
    }

    /// Inserts a row as-is, bypassing the open-session guard.
    pub fn seed(&self, record: AttendanceRecord) {
        let mut table = self.table.lock().unwrap();
        table.next_id = table.next_id.max(record.id);
        table.records.push(record);
    }
}

#[async_trait]
impl AttendanceStore for InMemoryAttendanceStore {
    async fn find_open_for_day(
        &self,
        user_id: u64,
        day: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, StoreError> {
        let table = self.table.lock().unwrap();
        Ok(table
            .records
            .iter()
            .filter(|r| r.user_id == user_id && r.work_date == day && r.is_open())
            .max_by_key(|r| (r.check_in, r.id))
            .cloned())
    }

    async fn insert_open(&self, new: NewAttendance) -> Result<AttendanceRecord, StoreError> {
        let mut table = self.table.lock().unwrap();
        let duplicate = table
            .records
            .iter()
            .any(|r| r.user_id == new.user_id && r.work_date == new.work_date && r.is_open());
        if duplicate {
            return Err(StoreError::OpenSessionExists);
        }

        table.next_id += 1;
        let record = AttendanceRecord {
            id: table.next_id,
            user_id: new.user_id,
            work_date: new.work_date,
            check_in: new.check_in,
            check_out: None,
            latitude: new.coordinates.latitude(),
            longitude: new.coordinates.longitude(),
            evidence_path: new.evidence_path,
        };
        table.records.push(record.clone());
        Ok(record)
    }

    async fn close_latest_open(
        &self,
        user_id: u64,
        at: NaiveDateTime,
    ) -> Result<Option<AttendanceRecord>, StoreError> {
        let mut table = self.table.lock().unwrap();
        let latest = table
            .records
            .iter_mut()
            .filter(|r| r.user_id == user_id && r.is_open())
            .max_by_key(|r| (r.check_in, r.id));

        Ok(latest.map(|record| {
            record.check_out = Some(at.max(record.check_in));
            record.clone()
        }))
    }

    async fn list_with_users(
        &self,
        name_filter: Option<&str>,
        limit: u32,
    ) -> Result<Vec<AttendanceReportRow>, StoreError> {
        let table = self.table.lock().unwrap();
        let needle = name_filter.map(str::to_lowercase);

        let mut rows: Vec<AttendanceReportRow> = table
            .records
            .iter()
            .filter_map(|r| {
                let name = table.users.get(&r.user_id)?;
                if let Some(needle) = &needle {
                    if !name.to_lowercase().contains(needle) {
                        return None;
                    }
                }
                Some(AttendanceReportRow {
                    id: r.id,
                    user_id: r.user_id,
                    user_name: name.clone(),
                    work_date: r.work_date,
                    check_in: r.check_in,
                    check_out: r.check_out,
                    latitude: r.latitude,
                    longitude: r.longitude,
                    evidence_path: Some(r.evidence_path.clone()),
                })
            })
            .collect();

        rows.sort_by(|a, b| (b.check_in, b.id).cmp(&(a.check_in, a.id)));
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn delete(&self, id: u64) -> Result<bool, StoreError> {
        let mut table = self.table.lock().unwrap();
        let before = table.records.len();
        table.records.retain(|r| r.id != id);
        Ok(table.records.len() != before)
    }
}

/// Store whose every call fails, for exercising the 500 path.
pub struct BrokenAttendanceStore;

#[async_trait]
impl AttendanceStore for BrokenAttendanceStore {
    async fn find_open_for_day(
        &self,
        _user_id: u64,
        _day: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, StoreError> {
        Err(StoreError::Backend("connection refused".into()))
    }

    async fn insert_open(&self, _new: NewAttendance) -> Result<AttendanceRecord, StoreError> {
        Err(StoreError::Backend("connection refused".into()))
    }

    async fn close_latest_open(
        &self,
        _user_id: u64,
        _at: NaiveDateTime,
    ) -> Result<Option<AttendanceRecord>, StoreError> {
        Err(StoreError::Backend("connection refused".into()))
    }

    async fn list_with_users(
        &self,
        _name_filter: Option<&str>,
        _limit: u32,
    ) -> Result<Vec<AttendanceReportRow>, StoreError> {
        Err(StoreError::Backend("connection refused".into()))
    }

    async fn delete(&self, _id: u64) -> Result<bool, StoreError> {
        Err(StoreError::Backend("connection refused".into()))
    }
}

pub struct InMemorySensorStore {
    samples: Mutex<Vec<SensorLog>>,
    base: NaiveDateTime,
}

impl InMemorySensorStore {
    /// Sample `n` (1-based) is stamped `base + n` seconds.
    pub fn starting_at(base: NaiveDateTime) -> Self {
        Self {
            samples: Mutex::default(),
            base,
        }
    }
}

#[async_trait]
impl SensorStore for InMemorySensorStore {
    async fn insert(&self, sample: NewSensorLog) -> Result<SensorLog, StoreError> {
        let mut samples = self.samples.lock().unwrap();
        let id = samples.len() as u64 + 1;
        let log = SensorLog {
            id,
            temperature: sample.temperature,
            humidity: sample.humidity,
            light: sample.light,
            created_at: self.base + chrono::Duration::seconds(id as i64),
        };
        samples.push(log.clone());
        Ok(log)
    }

    async fn latest(&self, limit: u32) -> Result<Vec<SensorLog>, StoreError> {
        let mut newest = self.samples.lock().unwrap().clone();
        newest.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        newest.truncate(limit as usize);
        newest.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        Ok(newest)
    }
}
