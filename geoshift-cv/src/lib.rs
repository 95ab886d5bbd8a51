//! geoshift-cv library - clipboard coordinate converter service
//!
//! Exposes the application state and router for the binary and for
//! integration tests.

pub mod api;
pub mod clipboard;
pub mod enrichment;
pub mod error;
pub mod geocode;
pub mod monitor;
pub mod session;

pub use crate::error::{ApiError, ApiResult};

use std::sync::Arc;

use axum::Router;
use geoshift_common::CalibrationStore;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::clipboard::Clipboard;
use crate::enrichment::EnrichmentQueue;
use crate::geocode::PlaceLookup;
use crate::monitor::{Monitor, PollTiming};

/// Calibration store shared by handlers, the observation loop and the
/// enrichment worker
pub type SharedStore = Arc<Mutex<CalibrationStore>>;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Calibration points
    pub store: SharedStore,
    /// Acquisition session and observation loop
    pub monitor: Monitor,
    /// Backfill queue for missing place names
    pub enrichment: EnrichmentQueue,
    /// Clipboard used by the copy endpoint
    pub clipboard: Arc<dyn Clipboard>,
}

impl AppState {
    /// Create application state and start the enrichment worker.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(
        store: CalibrationStore,
        clipboard: Arc<dyn Clipboard>,
        places: Arc<dyn PlaceLookup>,
        timing: PollTiming,
    ) -> Self {
        let store: SharedStore = Arc::new(Mutex::new(store));
        let (enrichment, _worker) = EnrichmentQueue::spawn(Arc::clone(&store), Arc::clone(&places));
        let monitor = Monitor::new(Arc::clone(&store), Arc::clone(&clipboard), places, timing);

        Self {
            store,
            monitor,
            enrichment,
            clipboard,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::ui_routes())
        .merge(api::health_routes())
        .merge(api::convert_routes())
        .merge(api::monitoring_routes())
        .merge(api::calibration_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
