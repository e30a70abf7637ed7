//! Great-circle distance on the WGS84 sphere approximation
//!
//! The haversine formula is total over finite input: every well-formed pair of
//! coordinates produces a distance, invalid coordinates produce a meaningless
//! but finite one. Validation belongs to the marker source, not here.

use crate::GeoPoint;

/// Mean Earth radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Compute the haversine distance between two WGS84 coordinates in kilometers
///
/// Deterministic and symmetric up to floating-point rounding; returns exactly
/// zero for identical coordinates.
#[inline]
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Haversine distance between two markers in kilometers
#[inline]
pub fn point_distance_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    haversine_km(a.latitude(), a.longitude(), b.latitude(), b.longitude())
}
