//! Latitude/longitude point type

use crate::geodesy;
use geo::Point;

/// A point on the Earth's surface in degrees
///
/// Backed by a `geo::Point` with x = longitude and y = latitude. The range is not enforced;
/// inputs are assumed well-formed. Radian accessors are conversions, not stored values.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint(Point<f64>);

impl GeoPoint {
    /// Create a point from latitude and longitude in degrees
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self(Point::new(lon, lat))
    }

    /// Latitude in degrees
    #[inline]
    pub fn lat(&self) -> f64 {
        self.0.y()
    }

    /// Longitude in degrees
    #[inline]
    pub fn lon(&self) -> f64 {
        self.0.x()
    }

    #[inline]
    pub fn lat_rad(&self) -> f64 {
        geodesy::to_radians(self.lat())
    }

    #[inline]
    pub fn lon_rad(&self) -> f64 {
        geodesy::to_radians(self.lon())
    }

    /// Great-circle distance to another point in meters
    #[inline]
    pub fn distance_to(&self, to: GeoPoint) -> f64 {
        geodesy::distance(*self, to)
    }

    /// Initial bearing toward another point in degrees [0, 360)
    #[inline]
    pub fn bearing_to(&self, to: GeoPoint) -> f64 {
        geodesy::bearing(*self, to)
    }

    /// Point reached by travelling `distance_m` meters along `bearing_deg`
    #[inline]
    pub fn destination(&self, bearing_deg: f64, distance_m: f64) -> GeoPoint {
        geodesy::destination(*self, bearing_deg, distance_m)
    }
}

impl From<Point<f64>> for GeoPoint {
    fn from(point: Point<f64>) -> Self {
        Self(point)
    }
}

impl From<GeoPoint> for Point<f64> {
    fn from(point: GeoPoint) -> Self {
        point.0
    }
}
