//! Server error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// The assertion was rejected; carries the verifier's reason
    #[error("{0}")]
    AssertionRejected(String),

    /// A dependency (a primary or BigTent) could not be consulted
    #[error("{0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
            ServerError::AssertionRejected(reason) => {
                tracing::info!("assertion rejected: {}", reason);
                (StatusCode::UNAUTHORIZED, reason.as_str())
            }
            ServerError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.as_str()),
            ServerError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = json!({ "success": false, "reason": message });
        (status, axum::Json(body)).into_response()
    }
}
