//! One-shot conversion and clipboard endpoints

use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use geoshift_common::geo::CoordinateToken;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::SuccessResponse;
use crate::error::{ApiError, ApiResult};
use crate::monitor::convert_point;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ConvertRequest {
    #[serde(default)]
    pub coords: String,
}

#[derive(Debug, Serialize)]
pub struct ConvertResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CopyRequest {
    #[serde(default)]
    pub text: String,
}

/// POST /api/convert
///
/// Converts the first coordinate pair found in `coords`.
pub async fn convert(
    State(state): State<AppState>,
    Json(request): Json<ConvertRequest>,
) -> Json<ConvertResponse> {
    let Some(point) = CoordinateToken::extract(&request.coords).and_then(|t| t.point()) else {
        debug!("No coordinates in convert request");
        return Json(ConvertResponse {
            success: false,
            result: None,
            error: Some("Invalid coordinate format".to_string()),
        });
    };

    let result = convert_point(&state.store, point).await;
    info!(input = %point, output = %result, "Converted coordinates on request");

    Json(ConvertResponse {
        success: true,
        result: Some(result),
        error: None,
    })
}

/// POST /api/clipboard/copy
pub async fn copy_to_clipboard(
    State(state): State<AppState>,
    Json(request): Json<CopyRequest>,
) -> ApiResult<Json<SuccessResponse>> {
    let clipboard = Arc::clone(&state.clipboard);
    tokio::task::spawn_blocking(move || clipboard.write_text(&request.text))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    Ok(Json(SuccessResponse::ok()))
}

pub fn convert_routes() -> Router<AppState> {
    Router::new()
        .route("/api/convert", post(convert))
        .route("/api/clipboard/copy", post(copy_to_clipboard))
}
