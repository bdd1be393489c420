use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::error::AttendanceError;
use crate::model::attendance::{AttendanceRecord, Coordinates};
use crate::service::evidence::EvidenceUpload;
use crate::service::report::ReportService;
use crate::service::session::AttendanceService;
use crate::utils::multipart::read_check_in_form;
use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;

/// Multipart body of the check-in request.
#[allow(dead_code)]
#[derive(ToSchema)]
pub struct CheckInForm {
    #[schema(example = json!(-6.2))]
    pub latitude: f64,
    #[schema(example = 106.8)]
    pub longitude: f64,
    /// Selfie taken at check-in (jpeg, png or webp).
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceResponse {
    #[schema(example = "success")]
    pub status: &'static str,
    #[schema(example = "Checked in successfully")]
    pub message: &'static str,
    pub data: AttendanceRecord,
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/presensi/check-in",
    request_body(content = CheckInForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Checked in successfully", body = AttendanceResponse),
        (status = 400, description = "Missing image or location", body = Object, example = json!({
            "status": "error",
            "message": "Location is required"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Already checked in today", body = Object, example = json!({
            "status": "error",
            "message": "Already checked in today"
        })),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    service: web::Data<AttendanceService>,
    config: web::Data<Config>,
    payload: Multipart,
) -> Result<HttpResponse, AttendanceError> {
    let form = read_check_in_form(payload, config.max_evidence_bytes).await?;

    let coordinates = Coordinates::parse(form.latitude.as_deref(), form.longitude.as_deref())?;
    let image = form
        .image
        .ok_or_else(|| AttendanceError::validation("Selfie image is required"))?;
    let evidence = EvidenceUpload::new(
        image,
        form.image_content_type.as_deref(),
        config.max_evidence_bytes,
    )?;

    let record = service.check_in(auth.user_id, coordinates, evidence).await?;

    Ok(HttpResponse::Ok().json(AttendanceResponse {
        status: "success",
        message: "Checked in successfully",
        data: record,
    }))
}

/// Check-out endpoint
#[utoipa::path(
    post,
    path = "/api/presensi/check-out",
    responses(
        (status = 200, description = "Checked out successfully", body = AttendanceResponse),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "No open attendance session", body = Object, example = json!({
            "status": "error",
            "message": "No open attendance session found"
        })),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    service: web::Data<AttendanceService>,
) -> Result<HttpResponse, AttendanceError> {
    let record = service.check_out(auth.user_id).await?;

    Ok(HttpResponse::Ok().json(AttendanceResponse {
        status: "success",
        message: "Checked out successfully",
        data: record,
    }))
}

/// Delete an attendance record
#[utoipa::path(
    delete,
    path = "/api/presensi/{id}",
    params(
        ("id", Path, description = "Attendance record ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted", body = Object, example = json!({
            "status": "success",
            "message": "Attendance record deleted"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Attendance record not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn delete_attendance(
    auth: AuthUser,
    reports: web::Data<ReportService>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AttendanceError> {
    auth.require_hr_or_admin()?;

    reports.delete(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "Attendance record deleted"
    })))
}
