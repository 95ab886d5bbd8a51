//! HTTP API handlers for geoshift-cv

pub mod calibration;
pub mod convert;
pub mod health;
pub mod monitoring;
pub mod ui;

pub use calibration::calibration_routes;
pub use convert::convert_routes;
pub use health::health_routes;
pub use monitoring::monitoring_routes;
pub use ui::ui_routes;

use serde::Serialize;

/// Acknowledgment body shared by the control endpoints
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }

    pub fn from_result<T, E: std::fmt::Display>(result: Result<T, E>, what: &str) -> Self {
        match result {
            Ok(_) => Self::ok(),
            Err(e) => {
                tracing::warn!(error = %e, "{} failed", what);
                Self { success: false }
            }
        }
    }
}
