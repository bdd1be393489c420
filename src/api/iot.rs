use crate::error::AttendanceError;
use crate::model::sensor_log::SensorLog;
use crate::service::sensor::{SensorLogService, parse_sample};
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PingRequest {
    #[schema(example = "hello")]
    pub message: Option<String>,
    #[schema(example = "esp32-01")]
    pub device_id: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct SensorHistoryResponse {
    #[schema(example = "success")]
    pub status: &'static str,
    pub data: Vec<SensorLog>,
}

/// Device connectivity check
#[utoipa::path(
    post,
    path = "/api/iot/ping",
    request_body = PingRequest,
    responses(
        (status = 200, description = "Connection acknowledged", body = Object, example = json!({
            "status": "ok",
            "reply": "Server received the connection"
        }))
    ),
    tag = "IoT"
)]
pub async fn ping(payload: web::Json<PingRequest>) -> HttpResponse {
    info!(
        device_id = payload.device_id.as_deref().unwrap_or("unknown"),
        message = payload.message.as_deref().unwrap_or(""),
        "Device ping"
    );

    HttpResponse::Ok().json(json!({
        "status": "ok",
        "reply": "Server received the connection"
    }))
}

/// Ingest a sensor sample
#[utoipa::path(
    post,
    path = "/api/iot/data",
    request_body(content = Object, example = json!({
        "suhu": 28.5,
        "kelembaban": 71,
        "cahaya": 512
    })),
    responses(
        (status = 201, description = "Sample saved", body = Object, example = json!({
            "status": "ok",
            "message": "Data saved"
        })),
        (status = 400, description = "Missing temperature or humidity"),
        (status = 500, description = "Internal server error")
    ),
    tag = "IoT"
)]
pub async fn receive_data(
    sensors: web::Data<SensorLogService>,
    payload: web::Json<Value>,
) -> Result<HttpResponse, AttendanceError> {
    let sample = parse_sample(&payload)?;
    sensors.record(sample).await?;

    Ok(HttpResponse::Created().json(json!({
        "status": "ok",
        "message": "Data saved"
    })))
}

/// Recent sensor history, oldest first
#[utoipa::path(
    get,
    path = "/api/iot/history",
    responses(
        (status = 200, description = "Latest samples in chronological order", body = SensorHistoryResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "IoT"
)]
pub async fn history(
    sensors: web::Data<SensorLogService>,
) -> Result<HttpResponse, AttendanceError> {
    let data = sensors.history().await?;

    Ok(HttpResponse::Ok().json(SensorHistoryResponse {
        status: "success",
        data,
    }))
}
