//! Status and mode control endpoints

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use super::SuccessResponse;
use crate::session::StatusSnapshot;
use crate::AppState;

/// GET /api/status response
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    #[serde(flatten)]
    pub session: StatusSnapshot,
    pub points_count: usize,
}

/// GET /api/status
pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let session = state.monitor.status().await;
    let points_count = state.store.lock().await.len();
    Json(StatusResponse {
        session,
        points_count,
    })
}

/// POST /api/monitoring/start
pub async fn start_monitoring(State(state): State<AppState>) -> Json<SuccessResponse> {
    state.monitor.start().await;
    Json(SuccessResponse::ok())
}

/// POST /api/calibration/start
pub async fn start_calibration(State(state): State<AppState>) -> Json<SuccessResponse> {
    state.monitor.start_calibration().await;
    Json(SuccessResponse::ok())
}

/// POST /api/monitoring/stop
pub async fn stop_monitoring(State(state): State<AppState>) -> Json<SuccessResponse> {
    state.monitor.stop().await;
    Json(SuccessResponse::ok())
}

pub fn monitoring_routes() -> Router<AppState> {
    Router::new()
        .route("/api/status", get(get_status))
        .route("/api/monitoring/start", post(start_monitoring))
        .route("/api/monitoring/stop", post(stop_monitoring))
        .route("/api/calibration/start", post(start_calibration))
}
