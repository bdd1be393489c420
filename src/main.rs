use actix_files::Files;
use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use std::sync::Arc;

mod api;
mod auth;
mod config;
mod db;
mod docs;
mod error;
mod model;
mod models;
mod routes;
mod service;
mod store;
mod utils;

use config::Config;
use db::init_db;

use crate::docs::ApiDoc;
use crate::service::clock::SystemClock;
use crate::service::evidence::{EVIDENCE_URL_SEGMENT, EvidenceResolver, LocalEvidenceStore};
use crate::service::report::ReportService;
use crate::service::sensor::SensorLogService;
use crate::service::session::AttendanceService;
use crate::store::mysql::{MySqlAttendanceStore, MySqlSensorStore};
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Presensi API"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!(addr = %config.server_addr, "Server starting...");

    let pool = init_db(&config.database_url, config.db_max_connections).await?;
    std::fs::create_dir_all(&config.upload_dir)?;

    let attendance_store = Arc::new(MySqlAttendanceStore::new(pool.clone()));
    let attendance = AttendanceService::new(
        attendance_store.clone(),
        Arc::new(LocalEvidenceStore::new(&config.upload_dir)),
        Arc::new(SystemClock),
    );
    let reports = ReportService::new(
        attendance_store,
        EvidenceResolver::new(&config.public_base_url),
        config.report_limit,
    );
    let sensors = SensorLogService::new(
        Arc::new(MySqlSensorStore::new(pool)),
        config.iot_history_limit,
    );

    let server_addr = config.server_addr.clone();
    let config_data = config.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(config_data.clone()))
            .app_data(Data::new(attendance.clone()))
            .app_data(Data::new(reports.clone()))
            .app_data(Data::new(sensors.clone()))
            .service(index)
            // Evidence selfies, read-only
            .service(Files::new(
                &format!("/{EVIDENCE_URL_SEGMENT}"),
                &config_data.upload_dir,
            ))
            .configure(|cfg| routes::configure(cfg, &config_data))
    })
    .bind(server_addr)?
    .run()
    .await?;

    Ok(())
}
