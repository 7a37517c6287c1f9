//! HTTP API
//!
//! actix-web handlers for the attribution endpoints and health probes,
//! using a uniform `{ code, message, data }` JSON envelope.

pub mod attribution;
pub mod health;
pub mod types;

pub use types::{api_result, error_response, success_response, ApiResponse, ErrorCode};

use actix_web::web;

/// Register all API routes on the app
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/attribution")
            .route("/report", web::get().to(attribution::get_report))
            .route("/compare", web::get().to(attribution::compare_models))
            .route(
                "/conversions/{id}",
                web::get().to(attribution::get_conversion),
            )
            .route(
                "/conversions/{id}/recalculate",
                web::post().to(attribution::recalculate),
            )
            .route("/conversions", web::post().to(attribution::post_conversion))
            .route("/touches", web::post().to(attribution::post_touch)),
    )
    .service(
        web::scope("/health")
            .route("", web::get().to(health::health_check))
            .route("/ready", web::get().to(health::readiness_check))
            .route("/live", web::get().to(health::liveness_check)),
    );
}
