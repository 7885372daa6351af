//! Pluggable route providers: trait abstraction for routing backends.
//!
//! Two implementations, selectable via [`RouteProviderKind`]:
//!
//! - **`StraightLineRouteProvider`**: densified great-circle chord between the
//!   two points. Zero dependencies; used offline and as a deterministic stand-in.
//! - **`OrsRouteProvider`** (feature `ors`): calls the OpenRouteService
//!   directions endpoint over HTTP.
//!
//! The provider is stored as a `Box<dyn RouteProvider>` ECS resource and is only
//! ever called from the route dispatch system, never from the services that
//! ask for routes.

use std::fmt;

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::clock::FetchTicket;
use crate::geo::{distance_m, interpolate, GeoPoint, Polyline};

pub mod error;
pub mod ors;

pub use error::RouteFetchError;

// ---------------------------------------------------------------------------
// Core types
// ---------------------------------------------------------------------------

/// Travel profile understood by the routing provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RouteProfile {
    #[default]
    DrivingCar,
    DrivingHgv,
    CyclingRegular,
    FootWalking,
}

impl RouteProfile {
    pub fn as_str(self) -> &'static str {
        match self {
            RouteProfile::DrivingCar => "driving-car",
            RouteProfile::DrivingHgv => "driving-hgv",
            RouteProfile::CyclingRegular => "cycling-regular",
            RouteProfile::FootWalking => "foot-walking",
        }
    }
}

impl fmt::Display for RouteProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RouteProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "driving-car" => Ok(RouteProfile::DrivingCar),
            "driving-hgv" => Ok(RouteProfile::DrivingHgv),
            "cycling-regular" => Ok(RouteProfile::CyclingRegular),
            "foot-walking" => Ok(RouteProfile::FootWalking),
            other => Err(format!("unknown route profile '{other}'")),
        }
    }
}

/// Trait for routing backends. Implementations must be `Send + Sync` so the
/// provider can be stored as a shared ECS resource.
pub trait RouteProvider: Send + Sync {
    /// Request a route from `start` to `end`. A success carries at least two points.
    fn route(
        &self,
        start: GeoPoint,
        end: GeoPoint,
        profile: RouteProfile,
    ) -> Result<Polyline, RouteFetchError>;
}

/// ECS resource wrapping a boxed route provider.
#[derive(Resource)]
pub struct RouteProviderResource(pub Box<dyn RouteProvider>);

/// Single-shot fetch that absorbs every failure into an empty polyline.
pub fn fetch_polyline(
    provider: &dyn RouteProvider,
    start: GeoPoint,
    end: GeoPoint,
    profile: RouteProfile,
) -> Polyline {
    match provider.route(start, end, profile) {
        Ok(polyline) => polyline,
        Err(err) => {
            err.report("route");
            Vec::new()
        }
    }
}

// ---------------------------------------------------------------------------
// Request / response plumbing
// ---------------------------------------------------------------------------

/// Which service asked for a route; decides where the response is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RoutePurpose {
    Delivery,
    WrongRoute,
    Recalculation,
}

/// A route request waiting for the dispatch system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteRequest {
    pub ticket: FetchTicket,
    pub purpose: RoutePurpose,
    /// Generation of the requesting service when the request was issued.
    pub generation: u64,
    pub start: GeoPoint,
    pub end: GeoPoint,
}

/// Outbox of route requests issued during the current event.
#[derive(Debug, Default, Resource)]
pub struct RouteRequests {
    next_ticket: u64,
    queue: Vec<RouteRequest>,
}

impl RouteRequests {
    pub fn issue(
        &mut self,
        purpose: RoutePurpose,
        generation: u64,
        start: GeoPoint,
        end: GeoPoint,
    ) -> FetchTicket {
        let ticket = FetchTicket(self.next_ticket);
        self.next_ticket += 1;
        self.queue.push(RouteRequest {
            ticket,
            purpose,
            generation,
            start,
            end,
        });
        ticket
    }

    pub fn drain(&mut self) -> Vec<RouteRequest> {
        std::mem::take(&mut self.queue)
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }
}

/// Outcome of one request, parked until its `RouteFetched` event fires.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteResponse {
    pub purpose: RoutePurpose,
    pub generation: u64,
    pub outcome: Result<Polyline, RouteFetchError>,
}

#[derive(Debug, Default, Resource)]
pub struct RouteResponses {
    pending: std::collections::HashMap<FetchTicket, RouteResponse>,
}

impl RouteResponses {
    pub fn insert(&mut self, ticket: FetchTicket, response: RouteResponse) {
        self.pending.insert(ticket, response);
    }

    pub fn take(&mut self, ticket: FetchTicket) -> Option<RouteResponse> {
        self.pending.remove(&ticket)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Straight-line provider (always available)
// ---------------------------------------------------------------------------

/// Default spacing between densified points.
pub const DEFAULT_STRAIGHT_LINE_SPACING_M: f64 = 50.0;
/// Smallest accepted spacing between densified points.
pub const MIN_STRAIGHT_LINE_SPACING_M: f64 = 1.0;
/// Upper bound on the points of one densified route.
pub const MAX_STRAIGHT_LINE_POINTS: usize = 100_000;

/// Routes along the straight chord between the two points, with a point every
/// `spacing_m` metres so the simulated vehicle has intermediate vertices.
#[derive(Debug, Clone, Copy)]
pub struct StraightLineRouteProvider {
    pub spacing_m: f64,
}

impl Default for StraightLineRouteProvider {
    fn default() -> Self {
        Self {
            spacing_m: DEFAULT_STRAIGHT_LINE_SPACING_M,
        }
    }
}

impl RouteProvider for StraightLineRouteProvider {
    fn route(
        &self,
        start: GeoPoint,
        end: GeoPoint,
        _profile: RouteProfile,
    ) -> Result<Polyline, RouteFetchError> {
        if !start.is_finite() || !end.is_finite() {
            return Err(RouteFetchError::InvalidRequest(
                "non-finite coordinate".to_string(),
            ));
        }
        if !self.spacing_m.is_finite() || self.spacing_m < MIN_STRAIGHT_LINE_SPACING_M {
            return Err(RouteFetchError::InvalidRequest(format!(
                "straight-line spacing must be at least {MIN_STRAIGHT_LINE_SPACING_M} m, got {}",
                self.spacing_m
            )));
        }
        let length = distance_m(start, end);
        let steps = (length / self.spacing_m).ceil().max(1.0);
        if steps >= MAX_STRAIGHT_LINE_POINTS as f64 {
            return Err(RouteFetchError::InvalidRequest(format!(
                "{length:.0} m at {} m spacing exceeds {MAX_STRAIGHT_LINE_POINTS} points",
                self.spacing_m
            )));
        }
        let steps = steps as usize;
        let polyline = (0..=steps)
            .map(|i| interpolate(start, end, i as f64 / steps as f64))
            .collect();
        Ok(polyline)
    }
}

// ---------------------------------------------------------------------------
// Factory: build a provider from RouteProviderKind
// ---------------------------------------------------------------------------

/// Which routing backend to use. Stored in [`crate::config::NavigationConfig`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RouteProviderKind {
    /// Straight chord, zero external dependencies.
    StraightLine { spacing_m: f64 },
    /// OpenRouteService HTTP endpoint.
    #[cfg(feature = "ors")]
    Ors { endpoint: String, api_key: String },
}

impl Default for RouteProviderKind {
    fn default() -> Self {
        RouteProviderKind::StraightLine {
            spacing_m: DEFAULT_STRAIGHT_LINE_SPACING_M,
        }
    }
}

impl RouteProviderKind {
    /// Reject descriptors whose provider could not serve a route.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            RouteProviderKind::StraightLine { spacing_m } => {
                if !spacing_m.is_finite() || *spacing_m < MIN_STRAIGHT_LINE_SPACING_M {
                    return Err(format!(
                        "straight_line spacing_m must be >= {MIN_STRAIGHT_LINE_SPACING_M}, got {spacing_m}"
                    ));
                }
                Ok(())
            }
            #[cfg(feature = "ors")]
            RouteProviderKind::Ors { endpoint, .. } => {
                if endpoint.is_empty() {
                    return Err("ors endpoint must not be empty".to_string());
                }
                Ok(())
            }
        }
    }
}

/// Construct a boxed [`RouteProvider`] from a [`RouteProviderKind`] descriptor.
pub fn build_route_provider(kind: &RouteProviderKind) -> Box<dyn RouteProvider> {
    match kind {
        RouteProviderKind::StraightLine { spacing_m } => Box::new(StraightLineRouteProvider {
            spacing_m: *spacing_m,
        }),

        #[cfg(feature = "ors")]
        RouteProviderKind::Ors { endpoint, api_key } => {
            if api_key.is_empty() {
                log::warn!("ORS provider configured without an API key; requests will be rejected");
            }
            Box::new(ors::OrsRouteProvider::new(endpoint, api_key))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::polyline_length_m;

    const A: GeoPoint = GeoPoint::new(-22.90, -47.06);
    const B: GeoPoint = GeoPoint::new(-22.91, -47.07);

    #[test]
    fn straight_line_densifies_and_keeps_endpoints() {
        let provider = StraightLineRouteProvider::default();
        let route = provider
            .route(A, B, RouteProfile::DrivingCar)
            .expect("route");
        assert_eq!(route.first(), Some(&A));
        assert_eq!(route.last(), Some(&B));
        // ~1.5 km at 50 m spacing
        assert!(route.len() > 30, "only {} points", route.len());
        let chord = distance_m(A, B);
        assert!((polyline_length_m(&route) - chord).abs() < 1.0);
    }

    #[test]
    fn straight_line_rejects_non_finite_points() {
        let provider = StraightLineRouteProvider::default();
        let err = provider
            .route(GeoPoint::new(f64::NAN, 0.0), B, RouteProfile::DrivingCar)
            .unwrap_err();
        assert!(matches!(err, RouteFetchError::InvalidRequest(_)));
    }

    #[test]
    fn straight_line_rejects_degenerate_spacing() {
        for spacing_m in [1e-9, 1e-320, 0.0, -5.0, f64::NAN, f64::INFINITY] {
            let provider = StraightLineRouteProvider { spacing_m };
            let err = provider
                .route(A, B, RouteProfile::DrivingCar)
                .unwrap_err();
            assert!(
                matches!(err, RouteFetchError::InvalidRequest(_)),
                "spacing {spacing_m}: {err:?}"
            );
        }
    }

    #[test]
    fn straight_line_caps_point_count() {
        let provider = StraightLineRouteProvider {
            spacing_m: MIN_STRAIGHT_LINE_SPACING_M,
        };
        let far = GeoPoint::new(45.0, 10.0);
        let err = provider.route(A, far, RouteProfile::DrivingCar).unwrap_err();
        assert!(matches!(err, RouteFetchError::InvalidRequest(_)));

        let route = provider.route(A, B, RouteProfile::DrivingCar).expect("route");
        assert!(route.len() < MAX_STRAIGHT_LINE_POINTS);
    }

    #[test]
    fn provider_kind_validation() {
        assert!(RouteProviderKind::default().validate().is_ok());
        assert!(RouteProviderKind::StraightLine { spacing_m: 1e-9 }
            .validate()
            .is_err());
        assert!(RouteProviderKind::StraightLine { spacing_m: f64::NAN }
            .validate()
            .is_err());
    }

    #[test]
    fn fetch_polyline_absorbs_errors() {
        let provider = StraightLineRouteProvider::default();
        let route = fetch_polyline(
            &provider,
            GeoPoint::new(f64::NAN, 0.0),
            B,
            RouteProfile::DrivingCar,
        );
        assert!(route.is_empty());
    }

    #[test]
    fn request_tickets_are_unique_and_drained_in_order() {
        let mut requests = RouteRequests::default();
        let first = requests.issue(RoutePurpose::Delivery, 1, A, B);
        let second = requests.issue(RoutePurpose::WrongRoute, 1, B, A);
        assert_ne!(first, second);

        let drained = requests.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].ticket, first);
        assert_eq!(drained[1].purpose, RoutePurpose::WrongRoute);
        assert!(requests.is_empty());
    }

    #[test]
    fn profile_round_trips_through_str() {
        for profile in [
            RouteProfile::DrivingCar,
            RouteProfile::DrivingHgv,
            RouteProfile::CyclingRegular,
            RouteProfile::FootWalking,
        ] {
            assert_eq!(profile.as_str().parse::<RouteProfile>(), Ok(profile));
        }
        assert!("hovercraft".parse::<RouteProfile>().is_err());
    }

    #[test]
    fn default_provider_kind_is_straight_line() {
        assert!(matches!(
            RouteProviderKind::default(),
            RouteProviderKind::StraightLine { .. }
        ));
    }
}
