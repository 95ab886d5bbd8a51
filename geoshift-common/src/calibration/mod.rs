//! Calibration points and their persistent store
//!
//! A calibration point is identified by its printed source and target text
//! (trimmed), never by numeric equality: `56.5, 60.1` and `56.50, 60.10` are
//! different points.

mod geojson;
mod seed;
mod store;

pub use seed::BUILTIN_CALIBRATION;
pub use store::CalibrationStore;

use serde::{Deserialize, Serialize};

/// Place value while a lookup is in flight
pub const PLACE_LOADING: &str = "Loading...";
/// Place value when the geocoder knows nothing about the coordinate
pub const PLACE_NOT_FOUND: &str = "Place not found";
/// Place value when the geocoder could not be reached
pub const PLACE_LOOKUP_FAILED: &str = "Lookup failed";

/// Loading markers written by earlier releases
const LEGACY_LOADING: &[&str] = &["Загрузка...", "Loading..."];
/// Failure markers written by earlier releases
const LEGACY_UNRESOLVED: &[&str] = &["Город не найден", "Не удалось получить данные"];

/// True if `place` is a leftover in-flight marker.
pub fn is_loading_place(place: &str) -> bool {
    place == PLACE_LOADING || LEGACY_LOADING.contains(&place)
}

/// True if `place` should be looked up again.
pub fn needs_place(place: &str) -> bool {
    place.is_empty()
        || place == PLACE_NOT_FOUND
        || place == PLACE_LOOKUP_FAILED
        || is_loading_place(place)
        || LEGACY_UNRESOLVED.contains(&place)
}

/// A known-correct (source, target) pair with its resolved place name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibrationPoint {
    /// High-precision source coordinate, "lat, lon"
    #[serde(alias = "google")]
    pub source: String,
    /// Low-precision target coordinate, "lat, lon"
    #[serde(alias = "yandex")]
    pub target: String,
    /// Human-readable place, or one of the place sentinels
    #[serde(default, alias = "location")]
    pub place: String,
}

impl CalibrationPoint {
    pub fn new(source: impl Into<String>, target: impl Into<String>, place: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            place: place.into(),
        }
    }

    pub fn key(&self) -> PointKey {
        PointKey {
            source: self.source.clone(),
            target: self.target.clone(),
        }
    }
}

/// Text identity of a calibration point, used for deletion and lookups
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointKey {
    #[serde(alias = "google")]
    pub source: String,
    #[serde(alias = "yandex")]
    pub target: String,
}

impl PointKey {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    /// Exact match on trimmed text.
    pub fn matches(&self, point: &CalibrationPoint) -> bool {
        self.source.trim() == point.source.trim() && self.target.trim() == point.target.trim()
    }
}

/// A point offered for import; entries missing either coordinate are skipped
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportCandidate {
    #[serde(default, alias = "google")]
    pub source: Option<String>,
    #[serde(default, alias = "yandex")]
    pub target: Option<String>,
    #[serde(default, alias = "location")]
    pub place: Option<String>,
}
