use crate::api::attendance::{AttendanceResponse, CheckInForm};
use crate::api::iot::{PingRequest, SensorHistoryResponse};
use crate::api::report::DailyReportResponse;
use crate::model::attendance::AttendanceRecord;
use crate::model::sensor_log::SensorLog;
use crate::service::report::ReportEntry;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Presensi API",
        version = "0.1.0",
        description = r#"
## Attendance (Presensi) Service

Employees check in with a geolocated selfie and check out at the end of the
day. HR and administrators review the daily report with photo evidence.

### Key Features
- **Attendance**
  - Check-in with latitude, longitude and a selfie (multipart form)
  - Check-out closing the open session
- **Reports**
  - Daily attendance list joined with employee names, searchable by name
  - Record deletion for HR/Admin
- **IoT**
  - Temperature, humidity and light samples from field devices
  - Recent history for live charts

### Security
Attendance and report endpoints require a **JWT Bearer** access token.
IoT endpoints are open to devices and rate limited per IP.
"#,
    ),
    paths(
        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::delete_attendance,

        crate::api::report::daily_report,

        crate::api::iot::ping,
        crate::api::iot::receive_data,
        crate::api::iot::history
    ),
    components(
        schemas(
            AttendanceRecord,
            AttendanceResponse,
            CheckInForm,
            ReportEntry,
            DailyReportResponse,
            SensorLog,
            SensorHistoryResponse,
            PingRequest
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Attendance", description = "Check-in / check-out APIs"),
        (name = "Report", description = "Attendance review APIs"),
        (name = "IoT", description = "Sensor ingestion APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
