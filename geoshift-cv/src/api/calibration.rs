//! Calibration data endpoints
//!
//! Persistence failures are reported as `success: false` with a short error;
//! the in-memory collection stays usable either way.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use geoshift_common::calibration::ImportCandidate;
use geoshift_common::{CalibrationPoint, PointKey};
use serde::Serialize;
use tracing::{info, warn};

use super::SuccessResponse;
use crate::AppState;

/// Result of a batch operation on calibration points
#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchResponse {
    fn counted(count: usize) -> Self {
        Self {
            success: true,
            count: Some(count),
            message: None,
            error: None,
        }
    }

    fn failed(error: impl ToString) -> Self {
        Self {
            success: false,
            count: None,
            message: None,
            error: Some(error.to_string()),
        }
    }
}

/// GET /api/calibration/data, POST /api/calibration/export
pub async fn list_points(State(state): State<AppState>) -> Json<Vec<CalibrationPoint>> {
    Json(state.store.lock().await.points())
}

/// DELETE /api/calibration/data
///
/// Removes every point whose source and target text match an entry.
pub async fn delete_points(
    State(state): State<AppState>,
    Json(criteria): Json<Vec<PointKey>>,
) -> Json<BatchResponse> {
    if criteria.is_empty() {
        return Json(BatchResponse::failed("Nothing to delete"));
    }

    match state.store.lock().await.delete_batch(&criteria) {
        Ok(removed) => Json(BatchResponse::counted(removed)),
        Err(e) => {
            warn!(error = %e, "Deletion not saved");
            Json(BatchResponse::failed(e))
        }
    }
}

/// POST /api/calibration/save
pub async fn save_points(State(state): State<AppState>) -> Json<SuccessResponse> {
    let result = state.store.lock().await.save();
    Json(SuccessResponse::from_result(result, "Saving calibration"))
}

/// POST /api/calibration/load
///
/// Replaces the in-memory points with the file contents. Monitoring and
/// calibration keep their current mode; a pending half pair is kept too.
pub async fn load_points(State(state): State<AppState>) -> Json<SuccessResponse> {
    let result = state.store.lock().await.load();
    Json(SuccessResponse::from_result(result, "Loading calibration"))
}

/// POST /api/calibration/import
pub async fn import_points(
    State(state): State<AppState>,
    Json(candidates): Json<Vec<ImportCandidate>>,
) -> Json<BatchResponse> {
    match state.store.lock().await.import(candidates) {
        Ok(added) => Json(BatchResponse::counted(added)),
        Err(e) => {
            warn!(error = %e, "Import not saved");
            Json(BatchResponse::failed(e))
        }
    }
}

/// GET /api/calibration/geojson
pub async fn export_geojson(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(state.store.lock().await.geojson())
}

/// POST /api/calibration/update-locations
///
/// Queues every point without a resolved place for background lookup.
pub async fn update_locations(State(state): State<AppState>) -> Json<BatchResponse> {
    let marked = state.store.lock().await.mark_for_enrichment();

    let queued = marked
        .iter()
        .filter(|point| state.enrichment.enqueue(point.key()))
        .count();
    if queued < marked.len() {
        warn!(dropped = marked.len() - queued, "Enrichment worker not running");
    }
    info!(queued, "Queued points for place lookup");

    Json(BatchResponse {
        message: Some(format!("Queued: {}", queued)),
        ..BatchResponse::counted(queued)
    })
}

pub fn calibration_routes() -> Router<AppState> {
    Router::new()
        .route("/api/calibration/data", get(list_points).delete(delete_points))
        .route("/api/calibration/save", post(save_points))
        .route("/api/calibration/load", post(load_points))
        .route("/api/calibration/import", post(import_points))
        .route("/api/calibration/export", post(list_points))
        .route("/api/calibration/geojson", get(export_geojson))
        .route("/api/calibration/update-locations", post(update_locations))
}
