//! HTTP error responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use derive_more::{Display, Error};
use serde_json::json;
use tracing::{error, warn};

/// Error returned by a handler, rendered as `{"detail": ...}`.
#[derive(Debug, Clone, Display, Error)]
#[display("{}: {}", status, detail)]
pub struct ApiError {
    /// Response status.
    pub status: StatusCode,
    /// Message for the client.
    pub detail: String,
}

impl ApiError {
    /// Creates an error with the given status.
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    /// Unknown game identifier.
    pub fn game_not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Game not found")
    }

    /// Unparseable request body.
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, detail)
    }

    /// Background task failure.
    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, detail)
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        error!(error = %err, "Game task failed");
        Self::internal(format!("Game task failed: {}", err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, detail = %self.detail, "Request failed");
        } else {
            warn!(status = %self.status, detail = %self.detail, "Request rejected");
        }
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}
