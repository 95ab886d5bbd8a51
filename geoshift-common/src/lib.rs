//! # GeoShift Common Library
//!
//! Shared code for the GeoShift converter including:
//! - Coordinate model, distance metric and IDW transformation
//! - Source classification and pair ordering
//! - Calibration store with flat-file persistence
//! - Configuration loading
//! - Common error type

pub mod calibration;
pub mod config;
pub mod error;
pub mod geo;

pub use calibration::{CalibrationPoint, CalibrationStore, PointKey};
pub use error::{Error, Result};
pub use geo::{Anchor, CoordinatePoint, SourceKind};
