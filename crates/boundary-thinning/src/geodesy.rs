//! Geodesic primitives on a spherical Earth model
//!
//! All functions are pure and accept any finite latitude/longitude. Coincident points are
//! not special-cased: their distance is 0 and their bearing comes out of `atan2(0, 0) = 0`.

use crate::GeoPoint;
use std::f64::consts::PI;

/// Mean Earth radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Mean Earth radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Precomputed constant: PI / 180
const DEG_TO_RAD: f64 = PI / 180.0;

/// Convert degrees to radians
#[inline(always)]
pub fn to_radians(angle_deg: f64) -> f64 {
    DEG_TO_RAD * angle_deg
}

/// Convert radians to degrees
#[inline(always)]
pub fn to_degrees(angle_rad: f64) -> f64 {
    angle_rad / DEG_TO_RAD
}

/// Great-circle distance between two points in meters (Haversine)
#[inline]
pub fn distance(from: GeoPoint, to: GeoPoint) -> f64 {
    distance_with_altitude(from, 0.0, to, 0.0)
}

/// Haversine distance combined with an altitude difference
///
/// The horizontal great-circle distance and the vertical delta are composed as the two
/// legs of a flat right triangle. This is an approximation, not a 3D geodesic.
///
/// # Arguments
/// * `from`, `to` - End points
/// * `from_alt_m`, `to_alt_m` - Altitudes in meters (pass 0.0 to ignore height)
pub fn distance_with_altitude(from: GeoPoint, from_alt_m: f64, to: GeoPoint, to_alt_m: f64) -> f64 {
    let lat_distance = to_radians(to.lat() - from.lat());
    let lon_distance = to_radians(to.lon() - from.lon());

    let a = (lat_distance / 2.0).sin() * (lat_distance / 2.0).sin()
        + to_radians(from.lat()).cos()
            * to_radians(to.lat()).cos()
            * (lon_distance / 2.0).sin()
            * (lon_distance / 2.0).sin();
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    let horizontal = EARTH_RADIUS_KM * c * 1000.0;

    let height = from_alt_m - to_alt_m;

    (horizontal.powi(2) + height.powi(2)).sqrt()
}

/// Initial bearing (forward azimuth) from `from` toward `to`, in degrees within [0, 360)
pub fn bearing(from: GeoPoint, to: GeoPoint) -> f64 {
    let lat1 = from.lat_rad();
    let lat2 = to.lat_rad();
    let d_lon = to.lon_rad() - from.lon_rad();

    let y = d_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();

    // -180..180 relative to north
    let bearing = to_degrees(y.atan2(x));
    if bearing < 0.0 { bearing + 360.0 } else { bearing }
}

/// Bearing from `from` toward `to`, expressed relative to another heading
///
/// `relative_to` is first folded into (-180, 180]; the difference is folded the same way
/// when it exceeds 180.
pub fn relative_bearing(from: GeoPoint, to: GeoPoint, relative_to: f64) -> f64 {
    let relative_to = if relative_to > 180.0 {
        relative_to - 360.0
    } else {
        relative_to
    };

    let difference = bearing(from, to) - relative_to;
    if difference > 180.0 {
        difference - 360.0
    } else {
        difference
    }
}

/// Absolute bearing when `relative_to` is `None`, relative bearing otherwise
#[inline]
pub fn bearing_relative_to(from: GeoPoint, to: GeoPoint, relative_to: Option<f64>) -> f64 {
    match relative_to {
        Some(heading) => relative_bearing(from, to, heading),
        None => bearing(from, to),
    }
}

/// Project a point `distance_m` meters along the great circle starting at `bearing_deg`
pub fn destination(start: GeoPoint, bearing_deg: f64, distance_m: f64) -> GeoPoint {
    let lat1 = to_radians(start.lat());
    let lon1 = to_radians(start.lon());
    let brng = to_radians(bearing_deg);
    let delta = distance_m / EARTH_RADIUS_M;

    let lat2 = (lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * brng.cos()).asin();
    let lon2 = lon1
        + (brng.sin() * delta.sin() * lat1.cos()).atan2(delta.cos() - lat1.sin() * lat2.sin());

    GeoPoint::new(to_degrees(lat2), to_degrees(lon2))
}
