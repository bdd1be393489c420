use crate::auth::auth::AuthUser;
use crate::error::AttendanceError;
use crate::service::report::{ReportEntry, ReportService};
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DailyReportQuery {
    /// Case-insensitive substring of the employee name
    pub nama: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct DailyReportResponse {
    #[schema(example = "success")]
    pub status: &'static str,
    pub data: Vec<ReportEntry>,
}

/// Daily attendance report
#[utoipa::path(
    get,
    path = "/api/reports/daily",
    params(DailyReportQuery),
    responses(
        (status = 200, description = "Attendance records with user names", body = DailyReportResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Report"
)]
pub async fn daily_report(
    auth: AuthUser,
    reports: web::Data<ReportService>,
    query: web::Query<DailyReportQuery>,
) -> Result<HttpResponse, AttendanceError> {
    auth.require_hr_or_admin()?;

    debug!(requested_by = %auth.username, filter = ?query.nama, "Daily report requested");
    let data = reports.list_daily(query.nama.as_deref()).await?;

    Ok(HttpResponse::Ok().json(DailyReportResponse {
        status: "success",
        data,
    }))
}
