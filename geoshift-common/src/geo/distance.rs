//! Local flat-earth distance
//!
//! Planar approximation in degrees with longitude scaled by the cosine of the
//! mean latitude. Only meaningful for separations of tens of kilometres.

use super::CoordinatePoint;

/// Approximate separation of two points in degrees of latitude.
pub fn distance(p1: CoordinatePoint, p2: CoordinatePoint) -> f64 {
    let avg_lat = ((p1.lat + p2.lat) / 2.0).to_radians();
    let dlat = p1.lat - p2.lat;
    let dlon = (p1.lon - p2.lon) * avg_lat.cos();
    (dlat * dlat + dlon * dlon).sqrt()
}
