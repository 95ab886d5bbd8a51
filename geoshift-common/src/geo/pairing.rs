//! Ordering of a (source, target) coordinate pair
//!
//! The operator may paste the two coordinates in either order. Precision
//! classes decide when they differ; otherwise the current model is asked which
//! direction explains the pair with the smaller residual.

use serde::Serialize;

use super::{classify, distance, parse_loose, transform, Anchor, SourceKind};

/// How the order of a resolved pair was decided
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PairOrder {
    /// One high-precision and one low-precision value
    ByPrecision,
    /// Both values classify alike; order chosen by model residual.
    /// Callers must treat this as a guess and warn the operator.
    Ambiguous {
        /// Residual assuming the first value is the source
        forward_error: f64,
        /// Residual assuming the second value is the source
        reverse_error: f64,
    },
    /// At least one value is not a coordinate; inputs returned unchanged
    Unparsed,
}

/// Result of ordering a pair of raw coordinate strings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub source: String,
    pub target: String,
    pub order: PairOrder,
}

impl Resolution {
    fn new(source: &str, target: &str, order: PairOrder) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            order,
        }
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self.order, PairOrder::Ambiguous { .. })
    }
}

/// Decide which of `raw1`/`raw2` is the source and which the target.
pub fn resolve(raw1: &str, raw2: &str, anchors: &[Anchor]) -> Resolution {
    match (classify(raw1), classify(raw2)) {
        (SourceKind::HighPrecision, SourceKind::LowPrecision) => {
            return Resolution::new(raw1, raw2, PairOrder::ByPrecision);
        }
        (SourceKind::LowPrecision, SourceKind::HighPrecision) => {
            return Resolution::new(raw2, raw1, PairOrder::ByPrecision);
        }
        _ => {}
    }

    let (Some(p1), Some(p2)) = (parse_loose(raw1), parse_loose(raw2)) else {
        return Resolution::new(raw1, raw2, PairOrder::Unparsed);
    };

    let forward_error = distance(transform(p1, anchors), p2);
    let reverse_error = distance(transform(p2, anchors), p1);
    tracing::debug!(forward_error, reverse_error, "Resolving ambiguous pair by model residual");

    let order = PairOrder::Ambiguous {
        forward_error,
        reverse_error,
    };
    if reverse_error < forward_error {
        Resolution::new(raw2, raw1, order)
    } else {
        Resolution::new(raw1, raw2, order)
    }
}
