//! Coordinate model and parsing
//!
//! Coordinates travel through the system as text ("lat, lon") and are only
//! turned into numbers where geometry needs them. Printed text is the identity
//! of a calibration point, so parsing never rewrites the caller's string.

pub mod classify;
pub mod distance;
pub mod pairing;
pub mod transform;

pub use classify::{classify, SourceKind};
pub use distance::distance;
pub use pairing::{resolve, PairOrder, Resolution};
pub use transform::transform;

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Two decimal numbers separated by a comma. Integers without a fractional
/// part are not recognised.
static COORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([-+]?\d*\.\d+),\s*([-+]?\d*\.\d+)").expect("coordinate pattern is valid")
});

/// A latitude/longitude pair in degrees. No range validation is applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinatePoint {
    pub lat: f64,
    pub lon: f64,
}

impl CoordinatePoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Render with six fractional digits, the format consumers compare on.
    pub fn to_fixed(&self) -> String {
        format!("{:.6}, {:.6}", self.lat, self.lon)
    }
}

/// Shortest round-trip rendering, e.g. `56.87863, 60.517245`.
impl fmt::Display for CoordinatePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.lat, self.lon)
    }
}

/// Strict "lat, lon" parse: exactly two comma-separated floats.
impl FromStr for CoordinatePoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(',');
        let (Some(lat), Some(lon), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(Error::InvalidInput(format!("not a coordinate pair: {s:?}")));
        };
        let lat = lat
            .trim()
            .parse::<f64>()
            .map_err(|e| Error::InvalidInput(format!("bad latitude in {s:?}: {e}")))?;
        let lon = lon
            .trim()
            .parse::<f64>()
            .map_err(|e| Error::InvalidInput(format!("bad longitude in {s:?}: {e}")))?;
        Ok(Self { lat, lon })
    }
}

/// A coordinate pair found inside free text, kept as the matched digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinateToken {
    pub lat_text: String,
    pub lon_text: String,
}

impl CoordinateToken {
    /// Find the first coordinate pair in `text`.
    pub fn extract(text: &str) -> Option<Self> {
        let caps = COORD_RE.captures(text)?;
        Some(Self {
            lat_text: caps[1].to_string(),
            lon_text: caps[2].to_string(),
        })
    }

    /// Canonical "lat, lon" text of the matched pair.
    pub fn text(&self) -> String {
        format!("{}, {}", self.lat_text, self.lon_text)
    }

    pub fn point(&self) -> Option<CoordinatePoint> {
        let lat = self.lat_text.parse().ok()?;
        let lon = self.lon_text.parse().ok()?;
        Some(CoordinatePoint { lat, lon })
    }
}

/// Parse the first coordinate pair found anywhere in `text`.
pub fn parse_loose(text: &str) -> Option<CoordinatePoint> {
    CoordinateToken::extract(text)?.point()
}

/// A known (source, target) correspondence used as interpolation evidence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub source: CoordinatePoint,
    pub target: CoordinatePoint,
}
