use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::MySqlPool;
use tracing::debug;

use super::{AttendanceStore, SensorStore};
use crate::error::StoreError;
use crate::model::attendance::{AttendanceRecord, AttendanceReportRow, NewAttendance};
use crate::model::sensor_log::{NewSensorLog, SensorLog};
use crate::utils::sql::like_contains_pattern;

const RECORD_COLUMNS: &str =
    "id, user_id, work_date, check_in, check_out, latitude, longitude, evidence_path";

/// MySQL-backed attendance store.
///
/// The one-open-session-per-day rule is enforced by the
/// `uq_attendance_open_session` unique key on `(user_id, open_day)`.
#[derive(Clone)]
pub struct MySqlAttendanceStore {
    pool: MySqlPool,
}

impl MySqlAttendanceStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttendanceStore for MySqlAttendanceStore {
    async fn find_open_for_day(
        &self,
        user_id: u64,
        day: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, StoreError> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM attendance \
             WHERE user_id = ? AND work_date = ? AND check_out IS NULL \
             ORDER BY check_in DESC, id DESC LIMIT 1"
        );

        let record = sqlx::query_as::<_, AttendanceRecord>(&sql)
            .bind(user_id)
            .bind(day)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    async fn insert_open(&self, new: NewAttendance) -> Result<AttendanceRecord, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO attendance
                (user_id, work_date, check_in, latitude, longitude, evidence_path)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(new.user_id)
        .bind(new.work_date)
        .bind(new.check_in)
        .bind(new.coordinates.latitude())
        .bind(new.coordinates.longitude())
        .bind(&new.evidence_path)
        .execute(&self.pool)
        .await?;

        Ok(AttendanceRecord {
            id: result.last_insert_id(),
            user_id: new.user_id,
            work_date: new.work_date,
            check_in: new.check_in,
            check_out: None,
            latitude: new.coordinates.latitude(),
            longitude: new.coordinates.longitude(),
            evidence_path: new.evidence_path,
        })
    }

    async fn close_latest_open(
        &self,
        user_id: u64,
        at: NaiveDateTime,
    ) -> Result<Option<AttendanceRecord>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM attendance \
             WHERE user_id = ? AND check_out IS NULL \
             ORDER BY check_in DESC, id DESC LIMIT 1 FOR UPDATE"
        );
        let open = sqlx::query_as::<_, AttendanceRecord>(&sql)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(mut record) = open else {
            tx.rollback().await?;
            return Ok(None);
        };

        let closed_at = at.max(record.check_in);
        sqlx::query("UPDATE attendance SET check_out = ? WHERE id = ?")
            .bind(closed_at)
            .bind(record.id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        record.check_out = Some(closed_at);
        Ok(Some(record))
    }

    async fn list_with_users(
        &self,
        name_filter: Option<&str>,
        limit: u32,
    ) -> Result<Vec<AttendanceReportRow>, StoreError> {
        let where_clause = if name_filter.is_some() {
            "WHERE LOWER(u.name) LIKE ?"
        } else {
            ""
        };

        let sql = format!(
            r#"
            SELECT a.id, a.user_id, u.name AS user_name, a.work_date, a.check_in,
                   a.check_out, a.latitude, a.longitude, a.evidence_path
            FROM attendance a
            JOIN users u ON u.id = a.user_id
            {where_clause}
            ORDER BY a.check_in DESC, a.id DESC
            LIMIT ?
            "#
        );
        debug!(sql = %sql, filter = ?name_filter, limit, "Fetching attendance report");

        let mut query = sqlx::query_as::<_, AttendanceReportRow>(&sql);
        if let Some(filter) = name_filter {
            query = query.bind(like_contains_pattern(&filter.to_lowercase()));
        }
        let rows = query.bind(limit).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn delete(&self, id: u64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM attendance WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[derive(Clone)]
pub struct MySqlSensorStore {
    pool: MySqlPool,
}

impl MySqlSensorStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SensorStore for MySqlSensorStore {
    async fn insert(&self, sample: NewSensorLog) -> Result<SensorLog, StoreError> {
        let result = sqlx::query(
            "INSERT INTO sensor_logs (temperature, humidity, light) VALUES (?, ?, ?)",
        )
        .bind(sample.temperature)
        .bind(sample.humidity)
        .bind(sample.light)
        .execute(&self.pool)
        .await?;

        let stored = sqlx::query_as::<_, SensorLog>(
            "SELECT id, temperature, humidity, light, created_at FROM sensor_logs WHERE id = ?",
        )
        .bind(result.last_insert_id())
        .fetch_one(&self.pool)
        .await?;
        Ok(stored)
    }

    async fn latest(&self, limit: u32) -> Result<Vec<SensorLog>, StoreError> {
        let rows = sqlx::query_as::<_, SensorLog>(
            r#"
            SELECT id, temperature, humidity, light, created_at
            FROM (
                SELECT id, temperature, humidity, light, created_at
                FROM sensor_logs
                ORDER BY created_at DESC, id DESC
                LIMIT ?
            ) AS recent
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
