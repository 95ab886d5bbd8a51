//! Error types for geoshift-cv

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::clipboard::ClipboardError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Clipboard could not be read or written (503)
    #[error(transparent)]
    Clipboard(#[from] ClipboardError),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self {
            ApiError::Clipboard(_) => (StatusCode::SERVICE_UNAVAILABLE, "CLIPBOARD_ERROR"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_clipboard_error_maps_to_service_unavailable() {
        let response =
            ApiError::from(ClipboardError::Write("no display".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "CLIPBOARD_ERROR");
        assert_eq!(body["error"]["message"], "Clipboard write failed: no display");
    }
}
