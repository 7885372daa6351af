//! Diversion route generator: a route from the point where the driver chose to
//! "go wrong" to a fixed alternate destination. Only the simulated vehicle
//! follows it; it is never drawn as the official route.

use bevy_ecs::prelude::Resource;

use crate::clock::FetchTicket;
use crate::geo::{GeoPoint, Polyline};
use crate::routing::{RouteFetchError, RoutePurpose, RouteRequests};

/// Alternate destination used unless configured otherwise (central Campinas).
pub const DEFAULT_WRONG_DESTINATION: GeoPoint = GeoPoint::new(-22.9056, -47.0608);

#[derive(Debug, Clone, Resource)]
pub struct WrongRouteGenerator {
    destination: GeoPoint,
    is_wrong_route: bool,
    origin: Option<GeoPoint>,
    generation: u64,
    polyline: Polyline,
}

impl Default for WrongRouteGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_WRONG_DESTINATION)
    }
}

impl WrongRouteGenerator {
    pub fn new(destination: GeoPoint) -> Self {
        Self {
            destination,
            is_wrong_route: false,
            origin: None,
            generation: 0,
            polyline: Vec::new(),
        }
    }

    /// Feed the current inputs. A change invalidates any request in flight and
    /// either clears the route or issues a new request.
    pub fn set_inputs(
        &mut self,
        is_wrong_route: bool,
        origin: Option<GeoPoint>,
        requests: &mut RouteRequests,
    ) -> Option<FetchTicket> {
        if self.is_wrong_route == is_wrong_route && self.origin == origin {
            return None;
        }
        self.is_wrong_route = is_wrong_route;
        self.origin = origin;
        self.generation += 1;

        if !is_wrong_route {
            self.polyline.clear();
            return None;
        }

        let Some(origin) = origin else {
            log::warn!("[wrong-route] origin missing, no wrong route will be traced");
            self.polyline.clear();
            return None;
        };

        log::info!(
            "[wrong-route] requesting diversion from ({:.5}, {:.5}) to ({:.5}, {:.5})",
            origin.latitude,
            origin.longitude,
            self.destination.latitude,
            self.destination.longitude
        );
        Some(requests.issue(
            RoutePurpose::WrongRoute,
            self.generation,
            origin,
            self.destination,
        ))
    }

    /// Apply a provider outcome. Failures leave the route empty. Returns
    /// `false` when the response belongs to an outdated request.
    pub fn apply_response(
        &mut self,
        generation: u64,
        outcome: Result<Polyline, RouteFetchError>,
    ) -> bool {
        if generation != self.generation {
            log::debug!(
                "[wrong-route] discarding stale response (generation {generation}, current {})",
                self.generation
            );
            return false;
        }
        match outcome {
            Ok(polyline) => {
                log::info!("[wrong-route] diversion found ({} points)", polyline.len());
                self.polyline = polyline;
            }
            Err(err) => {
                err.report("wrong-route");
                self.polyline.clear();
            }
        }
        true
    }

    pub fn polyline(&self) -> &[GeoPoint] {
        &self.polyline
    }

    pub fn destination(&self) -> GeoPoint {
        self.destination
    }

    pub fn origin(&self) -> Option<GeoPoint> {
        self.origin
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}
