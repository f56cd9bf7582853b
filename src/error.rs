//! Error types for the verification service
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Failures surfaced by cache backends.
///
/// Serialization problems never appear here: corrupt remote entries are
/// self-healed into misses, and unencodable values are skipped at write
/// time. What remains is the transport layer.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The distributed backend could not be reached or answered with an error
    #[error("cache transport error: {0}")]
    Transport(#[from] redis::RedisError),
}

// Callers that only report the failure can carry it as plain text.
impl From<CacheError> for String {
    fn from(err: CacheError) -> Self {
        err.to_string()
    }
}

// == Service Error Enum ==
/// Failures surfaced by the cached provider services.
///
/// Provider HTTP failures are logged and degraded to empty results inside
/// each service, so they never appear here.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The configured provider requires credentials that are not set
    #[error("missing credentials: {0}")]
    MissingCredentials(String),

    /// An upstream provider call failed in transport or with an error status
    #[error("provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with an explicit rejection (e.g. rate limiting)
    #[error("provider error: {0}")]
    Provider(String),

    /// A cache backend operation failed
    #[error(transparent)]
    Cache(#[from] CacheError),
}

// == API Error Enum ==
/// Errors mapped onto HTTP responses.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request payload failed validation
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Unexpected internal failure
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
