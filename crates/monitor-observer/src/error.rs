//! Error types for the reporting API.
//!
//! [`ObserverError`] converts into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use monitor_types::DecodeError;

/// Errors that can occur in the reporting API layer.
#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    /// An `/update` body could not be decoded into an event.
    #[error("invalid event report: {0}")]
    InvalidPayload(#[from] DecodeError),
}

impl ObserverError {
    /// HTTP status this error maps to.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidPayload(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ObserverError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
