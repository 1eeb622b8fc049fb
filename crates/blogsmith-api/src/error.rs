//! API error handling
//!
//! Author: hephaex@gmail.com

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use blogsmith_core::BlogError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// API error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Human-readable message
    #[schema(example = "Missing topic")]
    pub error: String,
    /// Error code
    #[schema(example = "BAD_REQUEST")]
    pub code: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn generation_failed() -> Self {
        Self::new("INTERNAL_ERROR", "Blog generation failed")
    }

    pub fn unavailable() -> Self {
        Self::new("SERVICE_UNAVAILABLE", "Service not ready")
    }
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    /// Drafting failed; the cause is logged, never returned
    Generation(BlogError),
    Unavailable,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ApiError::bad_request(msg)),
            AppError::Generation(err) => {
                tracing::error!(error = %err, "Blog generation failed");
                (StatusCode::INTERNAL_SERVER_ERROR, ApiError::generation_failed())
            }
            AppError::Unavailable => (StatusCode::SERVICE_UNAVAILABLE, ApiError::unavailable()),
        };

        (status, Json(error)).into_response()
    }
}

/// Topics are validated before drafting starts, so any error the drafter
/// returns (a query/index dimension mismatch included) is a server fault.
impl From<BlogError> for AppError {
    fn from(err: BlogError) -> Self {
        AppError::Generation(err)
    }
}
