use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use super::evidence::EvidenceResolver;
use crate::error::AttendanceError;
use crate::model::attendance::AttendanceReportRow;
use crate::store::AttendanceStore;

/// One row of the daily attendance report.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ReportEntry {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 42)]
    pub user_id: u64,
    #[schema(example = "Alice")]
    pub user_name: String,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub work_date: NaiveDate,
    #[schema(example = "2026-01-05T08:01:12", format = "date-time", value_type = String)]
    pub check_in: NaiveDateTime,
    #[schema(format = "date-time", value_type = Option<String>, nullable = true)]
    pub check_out: Option<NaiveDateTime>,
    pub latitude: f64,
    pub longitude: f64,
    #[schema(nullable = true)]
    pub evidence_path: Option<String>,
    /// Public URL of the check-in selfie, absent when there is none.
    #[schema(example = "http://localhost:3001/uploads/5f0c6d3e.jpg", nullable = true)]
    pub evidence_url: Option<String>,
}

/// Administrative read/delete access to attendance records.
#[derive(Clone)]
pub struct ReportService {
    store: Arc<dyn AttendanceStore>,
    resolver: EvidenceResolver,
    limit: u32,
}

impl ReportService {
    pub fn new(store: Arc<dyn AttendanceStore>, resolver: EvidenceResolver, limit: u32) -> Self {
        Self {
            store,
            resolver,
            limit,
        }
    }

    /// Most recent check-ins first. A blank filter means no filter.
    pub async fn list_daily(
        &self,
        name_filter: Option<&str>,
    ) -> Result<Vec<ReportEntry>, AttendanceError> {
        let filter = name_filter.map(str::trim).filter(|f| !f.is_empty());
        let rows = self.store.list_with_users(filter, self.limit).await?;

        Ok(rows.into_iter().map(|row| self.to_entry(row)).collect())
    }

    pub async fn delete(&self, record_id: u64) -> Result<(), AttendanceError> {
        if !self.store.delete(record_id).await? {
            return Err(AttendanceError::NotFound);
        }
        info!(record_id, "Attendance record deleted");
        Ok(())
    }

    fn to_entry(&self, row: AttendanceReportRow) -> ReportEntry {
        let evidence_url = self.resolver.resolve(row.evidence_path.as_deref());
        ReportEntry {
            id: row.id,
            user_id: row.user_id,
            user_name: row.user_name,
            work_date: row.work_date,
            check_in: row.check_in,
            check_out: row.check_out,
            latitude: row.latitude,
            longitude: row.longitude,
            evidence_path: row.evidence_path,
            evidence_url,
        }
    }
}
