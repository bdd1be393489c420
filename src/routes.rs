use crate::{
    api::{attendance, iot, report},
    auth::middleware::auth_middleware,
    config::Config,
    error::AttendanceError,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

// Helper to build per-scope limiter
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .expect("period and burst size are non-zero");
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    let iot_limiter = Arc::new(build_limiter(config.rate_iot_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Extractor failures use the same JSON error body as the handlers.
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AttendanceError::validation(format!("Invalid JSON body: {err}")).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
        AttendanceError::validation(format!("Invalid path parameter: {err}")).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        AttendanceError::validation(format!("Invalid query string: {err}")).into()
    }));

    // Device endpoints, no bearer token. Registered first so the
    // authenticated prefix scope below does not swallow them.
    cfg.service(
        web::scope(&format!("{}/iot", config.api_prefix))
            .wrap(iot_limiter)
            .service(web::resource("/ping").route(web::post().to(iot::ping)))
            .service(web::resource("/data").route(web::post().to(iot::receive_data)))
            .service(web::resource("/history").route(web::get().to(iot::history))),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
            // authentication
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/presensi")
                    // /presensi/check-in
                    .service(web::resource("/check-in").route(web::post().to(attendance::check_in)))
                    // /presensi/check-out
                    .service(
                        web::resource("/check-out").route(web::post().to(attendance::check_out)),
                    )
                    // /presensi/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::delete().to(attendance::delete_attendance)),
                    ),
            )
            .service(
                web::scope("/reports")
                    // /reports/daily
                    .service(web::resource("/daily").route(web::get().to(report::daily_report))),
            ),
    );
}
