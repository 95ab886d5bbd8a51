//! GeoJSON export of calibration points for map previews

use serde_json::{json, Value};

use super::CalibrationPoint;
use crate::geo::CoordinatePoint;

const MARKER_COLOR: &str = "#FF6B6B";

/// One Point feature per parseable point, placed at its source coordinate.
pub(super) fn feature_collection(points: &[CalibrationPoint]) -> Value {
    let features: Vec<Value> = points
        .iter()
        .enumerate()
        .filter_map(|(idx, point)| {
            let source = point.source.parse::<CoordinatePoint>().ok()?;
            Some(json!({
                "type": "Feature",
                "geometry": {
                    "type": "Point",
                    // GeoJSON positions are [lon, lat]
                    "coordinates": [source.lon, source.lat],
                },
                "properties": {
                    "title": format!("Calibration point #{}", idx + 1),
                    "source": point.source,
                    "target": point.target,
                    "place": point.place,
                    "marker-color": MARKER_COLOR,
                    "marker-size": "medium",
                    "marker-symbol": "circle",
                },
            }))
        })
        .collect();

    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}
