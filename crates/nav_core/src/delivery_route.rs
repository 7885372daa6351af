//! Route from the driver to the selected delivery stop.

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::clock::FetchTicket;
use crate::geo::{GeoPoint, Polyline};
use crate::routing::{RouteFetchError, RoutePurpose, RouteRequests};

/// A delivery stop as seen by navigation. Stops without coordinates cannot be
/// routed to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delivery {
    pub id: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub location: Option<GeoPoint>,
}

impl Delivery {
    pub fn new(id: impl Into<String>, location: Option<GeoPoint>) -> Self {
        Self {
            id: id.into(),
            address: None,
            location,
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }
}

#[derive(Debug, Clone, Default, Resource)]
pub struct DeliveryRoute {
    origin: Option<GeoPoint>,
    delivery: Option<Delivery>,
    generation: u64,
    polyline: Polyline,
    loading: bool,
}

impl DeliveryRoute {
    /// Feed the current inputs; a new origin or delivery triggers a fetch.
    /// Missing inputs clear the route.
    pub fn set_inputs(
        &mut self,
        origin: Option<GeoPoint>,
        delivery: Option<&Delivery>,
        requests: &mut RouteRequests,
    ) -> Option<FetchTicket> {
        if self.origin == origin && self.delivery.as_ref() == delivery {
            return None;
        }
        self.origin = origin;
        self.delivery = delivery.cloned();
        self.generation += 1;

        let target = delivery.and_then(|d| d.location);
        let (Some(origin), Some(target)) = (origin, target) else {
            self.polyline.clear();
            self.loading = false;
            return None;
        };

        log::debug!(
            "[delivery-route] fetching route to delivery {}",
            delivery.map(|d| d.id.as_str()).unwrap_or_default()
        );
        self.loading = true;
        Some(requests.issue(RoutePurpose::Delivery, self.generation, origin, target))
    }

    /// Apply a provider outcome. Failures keep the last successful route.
    pub fn apply_response(
        &mut self,
        generation: u64,
        outcome: Result<Polyline, RouteFetchError>,
    ) -> bool {
        if generation != self.generation {
            log::debug!(
                "[delivery-route] discarding stale response (generation {generation}, current {})",
                self.generation
            );
            return false;
        }
        self.loading = false;
        match outcome {
            Ok(polyline) => {
                log::info!("[delivery-route] route ready ({} points)", polyline.len());
                self.polyline = polyline;
            }
            Err(err) => err.report("delivery-route"),
        }
        true
    }

    /// Forget the current route. A request still in flight is discarded when
    /// it completes.
    pub fn clear(&mut self) {
        self.polyline.clear();
        self.loading = false;
        self.generation += 1;
    }

    pub fn polyline(&self) -> &[GeoPoint] {
        &self.polyline
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn delivery(&self) -> Option<&Delivery> {
        self.delivery.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}
