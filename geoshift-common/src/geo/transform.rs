//! Source-to-target coordinate transformation
//!
//! With calibration anchors available the offset at the query point is the
//! inverse-square-distance weighted mean of the anchor offsets, so nearby
//! evidence dominates. Without anchors a fixed affine fit is used.

use super::{distance, Anchor, CoordinatePoint};

// Affine fallback: lat' = A*lat + B*lon + C, lon' = D*lat + E*lon + F
const A: f64 = 1.00002178;
const B: f64 = -0.000409512697;
const C: f64 = 0.0235679088;
const D: f64 = -0.0000552760272;
const E: f64 = 0.99995881;
const F: f64 = 0.00565924534;

/// Anchors closer than this are treated as the query itself.
pub const EXACT_MATCH_DISTANCE: f64 = 1e-7;

/// Affine fallback used when no calibration anchors exist.
pub fn linear_fallback(query: CoordinatePoint) -> CoordinatePoint {
    CoordinatePoint {
        lat: A * query.lat + B * query.lon + C,
        lon: D * query.lat + E * query.lon + F,
    }
}

/// Predict the target-provider coordinate for `query`.
pub fn transform(query: CoordinatePoint, anchors: &[Anchor]) -> CoordinatePoint {
    if anchors.is_empty() {
        return linear_fallback(query);
    }

    let mut total_weight = 0.0;
    let mut sum_dlat = 0.0;
    let mut sum_dlon = 0.0;

    for anchor in anchors {
        let dist = distance(query, anchor.source);
        if dist < EXACT_MATCH_DISTANCE {
            return anchor.target;
        }

        let weight = 1.0 / (dist * dist);
        total_weight += weight;
        sum_dlat += weight * (anchor.target.lat - anchor.source.lat);
        sum_dlon += weight * (anchor.target.lon - anchor.source.lon);
    }

    if total_weight == 0.0 {
        return query;
    }

    CoordinatePoint {
        lat: query.lat + sum_dlat / total_weight,
        lon: query.lon + sum_dlon / total_weight,
    }
}
