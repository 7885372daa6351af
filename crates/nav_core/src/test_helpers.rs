//! Test helpers for common test setup and utilities.
//!
//! Fixed points around Campinas, a scripted route provider and a ready-made
//! navigation world.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use bevy_ecs::prelude::World;

use crate::config::NavigationConfig;
use crate::delivery_route::Delivery;
use crate::geo::{GeoPoint, Polyline};
use crate::navigator::build_navigation_world;
use crate::routing::{RouteFetchError, RouteProfile, RouteProvider};

/// Driver start used across tests.
pub const DRIVER_START: GeoPoint = GeoPoint::new(-22.90, -47.06);
/// One point of the short reference path, roughly 1.5 km south-west of [`DRIVER_START`].
pub const PATH_END: GeoPoint = GeoPoint::new(-22.91, -47.07);
/// Av. Iguatemi, 777, Campinas.
pub const DELIVERY_STOP: GeoPoint = GeoPoint::new(-22.89531, -47.02115);

/// Two-point reference path.
pub fn short_path() -> Polyline {
    vec![DRIVER_START, PATH_END]
}

pub fn test_delivery() -> Delivery {
    Delivery::new("delivery-1", Some(DELIVERY_STOP))
        .with_address("Av. Iguatemi, 777, Vila Brandina, Campinas, SP")
}

/// One recorded call to a [`ScriptedRouteProvider`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteCall {
    pub start: GeoPoint,
    pub end: GeoPoint,
    pub profile: RouteProfile,
}

#[derive(Debug, Default)]
struct Script {
    outcomes: VecDeque<Result<Polyline, RouteFetchError>>,
    calls: Vec<RouteCall>,
}

/// Returns queued outcomes in order and records every call. With the queue
/// empty it answers with the two-point chord `[start, end]`.
///
/// Clones share the same script, so a test can keep a handle after boxing
/// the provider into a world.
#[derive(Debug, Default, Clone)]
pub struct ScriptedRouteProvider {
    script: Arc<Mutex<Script>>,
}

impl ScriptedRouteProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_route(&self, polyline: Polyline) -> &Self {
        self.lock().outcomes.push_back(Ok(polyline));
        self
    }

    pub fn push_error(&self, error: RouteFetchError) -> &Self {
        self.lock().outcomes.push_back(Err(error));
        self
    }

    pub fn calls(&self) -> Vec<RouteCall> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl RouteProvider for ScriptedRouteProvider {
    fn route(
        &self,
        start: GeoPoint,
        end: GeoPoint,
        profile: RouteProfile,
    ) -> Result<Polyline, RouteFetchError> {
        let mut script = self.lock();
        script.calls.push(RouteCall { start, end, profile });
        script
            .outcomes
            .pop_front()
            .unwrap_or_else(|| Ok(vec![start, end]))
    }
}

/// Create a navigation world with default configuration and a scripted provider.
pub fn create_test_world() -> World {
    build_navigation_world(
        &NavigationConfig::default(),
        Box::new(ScriptedRouteProvider::new()),
    )
}
