//! API envelope types and response helpers

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::Serialize;
use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::errors::PeanutError;

/// API error code enum, serialized as a number.
///
/// Banded by domain:
/// - 0: success
/// - 1000-1099: generic errors
/// - 6000-6099: attribution errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // Generic errors 1000-1099
    BadRequest = 1000,
    NotFound = 1004,
    InternalServerError = 1005,
    InvalidDateFormat = 1012,

    // Attribution errors 6000-6099
    AttributionQueryFailed = 6000,
    InvalidModel = 6001,
    ConversionNotFound = 6002,
}

/// Uniform response envelope
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl PeanutError {
    /// HTTP status the error maps to at the REST boundary
    pub fn http_status(&self) -> StatusCode {
        match self {
            PeanutError::ConversionNotFound(_) | PeanutError::NotFound(_) => {
                StatusCode::NOT_FOUND
            }
            PeanutError::InvalidModel(_)
            | PeanutError::Validation(_)
            | PeanutError::DateParse(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<&PeanutError> for ErrorCode {
    fn from(err: &PeanutError) -> Self {
        match err {
            PeanutError::ConversionNotFound(_) => ErrorCode::ConversionNotFound,
            PeanutError::NotFound(_) => ErrorCode::NotFound,
            PeanutError::InvalidModel(_) => ErrorCode::InvalidModel,
            PeanutError::DateParse(_) => ErrorCode::InvalidDateFormat,
            PeanutError::Validation(_) => ErrorCode::BadRequest,
            PeanutError::StorageOperation(_) | PeanutError::CacheConnection(_) => {
                ErrorCode::AttributionQueryFailed
            }
            _ => ErrorCode::InternalServerError,
        }
    }
}

/// Build a JSON response in the uniform envelope
pub fn json_response<T: Serialize>(
    status: StatusCode,
    code: ErrorCode,
    message: impl Into<String>,
    data: Option<T>,
) -> HttpResponse {
    HttpResponse::build(status)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(ApiResponse {
            code: code as i32,
            message: message.into(),
            data,
        })
}

pub fn success_response<T: Serialize>(data: T) -> HttpResponse {
    json_response(StatusCode::OK, ErrorCode::Success, "OK", Some(data))
}

pub fn error_response(status: StatusCode, error_code: ErrorCode, message: &str) -> HttpResponse {
    json_response::<()>(status, error_code, message, None)
}

/// Error response with status and code mapped from the error itself
pub fn error_from_peanut(err: &PeanutError) -> HttpResponse {
    error_response(err.http_status(), ErrorCode::from(err), err.message())
}

/// Uniform Result -> HttpResponse conversion
pub fn api_result<T: Serialize>(result: crate::errors::Result<T>) -> HttpResponse {
    match result {
        Ok(data) => success_response(data),
        Err(err) => {
            if err.http_status().is_server_error() {
                tracing::error!("API request failed: {}", err);
            }
            error_from_peanut(&err)
        }
    }
}
