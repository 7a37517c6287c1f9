//! Health probes
//!
//! Infrastructure endpoints, intentionally free of business logic so
//! orchestrator probes get fast answers.

use std::sync::Arc;
use std::time::Instant;

use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;
use tracing::trace;

use crate::api::types::success_response;
use crate::storage::MemoryStore;

/// Server start time, injected into app state at startup
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize)]
struct HealthStorageCheck {
    status: String,
    touches: usize,
    conversions: usize,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    timestamp: String,
    uptime_seconds: i64,
    storage: HealthStorageCheck,
    response_time_ms: u32,
}

pub async fn health_check(
    store: web::Data<Arc<MemoryStore>>,
    app_start_time: web::Data<AppStartTime>,
) -> impl Responder {
    let start_time = Instant::now();
    trace!("Received health check request");

    let now = chrono::Utc::now();
    let storage = HealthStorageCheck {
        status: "healthy".to_string(),
        touches: store.touch_count(),
        conversions: store.conversion_count(),
    };

    success_response(HealthResponse {
        status: "healthy".to_string(),
        timestamp: now.to_rfc3339(),
        uptime_seconds: (now - app_start_time.start_datetime).num_seconds().max(0),
        storage,
        response_time_ms: start_time.elapsed().as_millis() as u32,
    })
}

pub async fn readiness_check() -> impl Responder {
    trace!("Received readiness check request");
    HttpResponse::Ok()
        .append_header(("Content-Type", "text/plain"))
        .body("OK")
}

pub async fn liveness_check() -> impl Responder {
    trace!("Received liveness check request");
    HttpResponse::NoContent().finish()
}
