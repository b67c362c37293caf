//! Error handling for the HTTP API server.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use formu::ServiceError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Server-specific errors.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Unknown concept code: 404 with an empty body.
    #[error("not found")]
    NotFound,

    /// Malformed request parameters: 400 with a short message.
    #[error("{0}")]
    BadRequest(String),

    /// Upstream failure: 500, the request fails and no state is touched.
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND.into_response(),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message).into_response(),
            ApiError::Service(e) => {
                error!(error = %e, "request failed");
                let body = Json(json!({
                    "success": false,
                    "error": {
                        "code": "UPSTREAM_ERROR",
                        "message": e.to_string(),
                    },
                }));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

/// Result type for server handlers.
pub type ApiResult<T> = Result<T, ApiError>;
