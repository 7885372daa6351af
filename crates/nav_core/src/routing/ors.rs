//! OpenRouteService directions and geocode search: response parsing (always
//! available) and the blocking HTTP clients (feature `ors`).
//!
//! The provider speaks `[longitude, latitude]`; everything leaving this module
//! is a [`GeoPoint`] in `{latitude, longitude}` order.

use std::time::Duration;

use crate::geo::GeoPoint;

#[cfg(feature = "ors")]
mod client;
pub(crate) mod parser;
pub(crate) mod response;


#[cfg(feature = "ors")]
pub use client::{OrsGeocoder, OrsRouteProvider};

/// Public OpenRouteService endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.openrouteservice.org";

#[cfg_attr(not(feature = "ors"), allow(dead_code))]
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// `lng,lat` query parameter.
#[cfg_attr(not(feature = "ors"), allow(dead_code))]
pub(crate) fn coordinate_param(point: GeoPoint) -> String {
    format!("{},{}", point.longitude, point.latitude)
}
