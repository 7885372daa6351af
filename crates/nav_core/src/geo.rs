//! Geographic primitives: points, polylines, and the three pure helpers the
//! simulation needs (haversine distance, initial bearing, linear interpolation).

use serde::{Deserialize, Serialize};

/// Mean Earth radius in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A WGS84 coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Build from a provider `[longitude, latitude]` pair.
    pub fn from_lng_lat(pair: [f64; 2]) -> Self {
        Self::new(pair[1], pair[0])
    }

    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

/// Ordered sequence of points. Fewer than two points carries no segments.
pub type Polyline = Vec<GeoPoint>;

/// True when the polyline has at least one traversable edge.
pub fn is_traversable(polyline: &[GeoPoint]) -> bool {
    polyline.len() >= 2
}

/// Great-circle distance in metres.
pub fn distance_m(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let sin_d_lat = (d_lat / 2.0).sin();
    let sin_d_lon = (d_lon / 2.0).sin();

    let h = sin_d_lat * sin_d_lat + lat1.cos() * lat2.cos() * sin_d_lon * sin_d_lon;
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_M * c
}

/// Initial compass bearing from `a` to `b`, in `[0, 360)` degrees clockwise
/// from north. Coincident points yield 0.
pub fn bearing_deg(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let y = d_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();

    let bearing = (y.atan2(x).to_degrees() + 360.0) % 360.0;
    if !bearing.is_finite() || bearing >= 360.0 {
        0.0
    } else {
        bearing
    }
}

/// Linear interpolation in lat/lng space. Not geodesic; fine at street scale.
pub fn interpolate(a: GeoPoint, b: GeoPoint, t: f64) -> GeoPoint {
    // Weighted form so both endpoints are reproduced bit-for-bit.
    let s = 1.0 - t;
    GeoPoint {
        latitude: a.latitude * s + b.latitude * t,
        longitude: a.longitude * s + b.longitude * t,
    }
}

/// Sum of consecutive haversine distances.
pub fn polyline_length_m(polyline: &[GeoPoint]) -> f64 {
    polyline.windows(2).map(|w| distance_m(w[0], w[1])).sum()
}
