//! Attribution API endpoints
//!
//! - channel report per model (`GET /attribution/report`)
//! - five-model comparison (`GET /attribution/compare`)
//! - conversion detail with lazily computed attribution
//!   (`GET /attribution/conversions/{id}`)
//! - forced recomputation (`POST /attribution/conversions/{id}/recalculate`)
//! - ingestion boundary for touches and conversions (`POST`)

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use tracing::trace;

use crate::api::types::{api_result, error_response, ErrorCode};
use crate::attribution::{NewConversion, NewTouch};
use crate::services::AttributionService;

/// Query parameters shared by the report endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct AttributionQuery {
    pub model: Option<String>,
    /// Start bound (ISO 8601 or YYYY-MM-DD); missing means unbounded
    pub date_from: Option<String>,
    /// End bound; missing means unbounded
    pub date_to: Option<String>,
}

fn require_model(query: &AttributionQuery) -> Result<&str, HttpResponse> {
    match query.model.as_deref() {
        Some(model) if !model.is_empty() => Ok(model),
        _ => Err(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::BadRequest,
            "Query parameter 'model' is required",
        )),
    }
}

pub async fn get_report(
    service: web::Data<Arc<AttributionService>>,
    query: web::Query<AttributionQuery>,
) -> impl Responder {
    trace!("Received attribution report request: {:?}", query);
    let model = match require_model(&query) {
        Ok(model) => model,
        Err(resp) => return resp,
    };

    let range =
        AttributionService::parse_date_range(query.date_from.as_deref(), query.date_to.as_deref());
    api_result(service.get_report(model, range).await)
}

pub async fn compare_models(
    service: web::Data<Arc<AttributionService>>,
    query: web::Query<AttributionQuery>,
) -> impl Responder {
    trace!("Received model comparison request: {:?}", query);
    let range =
        AttributionService::parse_date_range(query.date_from.as_deref(), query.date_to.as_deref());
    api_result(service.compare_models(range).await)
}

pub async fn get_conversion(
    service: web::Data<Arc<AttributionService>>,
    path: web::Path<i64>,
    query: web::Query<AttributionQuery>,
) -> impl Responder {
    let conversion_id = path.into_inner();
    trace!("Received conversion detail request: {}", conversion_id);
    let model = match require_model(&query) {
        Ok(model) => model,
        Err(resp) => return resp,
    };

    api_result(service.get_conversion_detail(conversion_id, model).await)
}

pub async fn recalculate(
    service: web::Data<Arc<AttributionService>>,
    path: web::Path<i64>,
    query: web::Query<AttributionQuery>,
) -> impl Responder {
    let conversion_id = path.into_inner();
    let model = match require_model(&query) {
        Ok(model) => model,
        Err(resp) => return resp,
    };

    api_result(service.recalculate(conversion_id, model).await)
}

pub async fn post_touch(
    service: web::Data<Arc<AttributionService>>,
    payload: web::Json<NewTouch>,
) -> impl Responder {
    api_result(service.record_touch(payload.into_inner()).await)
}

pub async fn post_conversion(
    service: web::Data<Arc<AttributionService>>,
    payload: web::Json<NewConversion>,
) -> impl Responder {
    api_result(service.record_conversion(payload.into_inner()).await)
}
