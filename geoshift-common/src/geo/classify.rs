//! Source provider classification by decimal precision
//!
//! Google-style coordinates carry 14-15 fractional digits, Yandex-style ones
//! six. The longest fractional run decides: a trailing-zero truncation can make
//! one of the two numbers short, so averaging would misclassify.
//!
//! The threshold is a heuristic tied to the providers' output formats, not a
//! geodetic property.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static FRACTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.(\d+)").expect("fraction pattern is valid"));

/// Fractional digit runs longer than this mark a high-precision source.
pub const HIGH_PRECISION_MIN_DIGITS: usize = 8;

/// Estimated provenance of a coordinate string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Long fractional part, Google-like source coordinate
    HighPrecision,
    /// Short fractional part, Yandex-like target coordinate
    LowPrecision,
    /// No fractional digits found
    Unknown,
}

impl SourceKind {
    /// Provider name shown to the operator
    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::HighPrecision => "Google",
            SourceKind::LowPrecision => "Yandex",
            SourceKind::Unknown => "Unknown",
        }
    }

    /// What the operator should copy next to complete a pair
    pub fn counterpart_hint(&self) -> &'static str {
        match self {
            SourceKind::HighPrecision => "the Yandex coordinate (short)",
            SourceKind::LowPrecision => "the Google coordinate (long)",
            SourceKind::Unknown => "the second coordinate",
        }
    }
}

/// Classify raw coordinate text by its longest fractional digit run.
pub fn classify(text: &str) -> SourceKind {
    let max_digits = FRACTION_RE
        .captures_iter(text)
        .map(|caps| caps[1].len())
        .max();

    match max_digits {
        None => SourceKind::Unknown,
        Some(n) if n >= HIGH_PRECISION_MIN_DIGITS => SourceKind::HighPrecision,
        Some(_) => SourceKind::LowPrecision,
    }
}
