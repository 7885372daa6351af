//! Navigation orchestrator state: which polyline the vehicle follows, which
//! one is displayed, and where the driver effectively is.
//!
//! The resources here are read and written by the systems in
//! [`crate::systems`]; the selection rules are plain functions so they can be
//! tested without a world.

use std::collections::VecDeque;

use bevy_ecs::prelude::{Resource, World};
use serde::{Deserialize, Serialize};

use crate::clock::{EventKind, RepeatingTimer, SimulationClock};
use crate::controller::{SimulationController, SimulationFlags, SimulationMode};
use crate::delivery_route::{Delivery, DeliveryRoute};
use crate::engine::{SimulatedSample, SimulationEngine, DEFAULT_TICK_MS};
use crate::geo::{is_traversable, GeoPoint, Polyline};
use crate::recalculation::RouteRecalculation;
use crate::wrong_route::WrongRouteGenerator;

/// Operator commands and sensor updates, applied one per `InputReceived` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum NavigationInput {
    Start,
    Pause,
    Resume,
    Stop,
    ToggleWrongRoute,
    DriverLocation(GeoPoint),
    SelectDelivery(Option<Delivery>),
    ClearDeliveryRoute,
    SetSpeedKmh(f64),
}

/// Inputs waiting for their `InputReceived` event, oldest first.
#[derive(Debug, Default, Resource)]
pub struct PendingInputs(pub VecDeque<NavigationInput>);

/// Timer driving [`SimulationEngine::tick`].
#[derive(Debug, Clone, Copy, Resource)]
pub struct EngineTickTimer(pub RepeatingTimer);

impl Default for EngineTickTimer {
    fn default() -> Self {
        Self(RepeatingTimer::new(EventKind::SimulationTick, DEFAULT_TICK_MS))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Resource)]
pub struct NavigationState {
    /// Live GPS position of the driver.
    pub driver_location: Option<GeoPoint>,
    /// Origin of the delivery route while simulating; set from the first
    /// driver location seen after simulation was enabled.
    pub frozen_route_origin: Option<GeoPoint>,
    pub selected_delivery: Option<Delivery>,
    pub wrong_route_origin: Option<GeoPoint>,
    /// Correct route obtained while diverted, followed after the diversion ends.
    pub saved_correct_route: Option<Polyline>,
    /// Latest emitted sample, kept so the marker does not vanish while paused.
    pub last_sample: Option<SimulatedSample>,
}

impl NavigationState {
    pub fn route_origin(&self, simulation_enabled: bool) -> Option<GeoPoint> {
        if simulation_enabled {
            self.frozen_route_origin
        } else {
            self.driver_location
        }
    }

    /// Freeze the delivery route origin while simulating, release it otherwise.
    pub fn sync_route_origin(&mut self, simulation_enabled: bool) {
        if !simulation_enabled {
            self.frozen_route_origin = None;
        } else if self.frozen_route_origin.is_none() {
            self.frozen_route_origin = self.driver_location;
        }
    }

    pub fn effective_location(
        &self,
        simulation_enabled: bool,
        sample: Option<&SimulatedSample>,
    ) -> Option<GeoPoint> {
        if !simulation_enabled {
            return self.driver_location;
        }
        sample
            .or(self.last_sample.as_ref())
            .map(|s| s.position)
            .or(self.driver_location)
    }

    pub fn delivery_target(&self) -> Option<GeoPoint> {
        self.selected_delivery.as_ref().and_then(|d| d.location)
    }

    pub fn saved_route(&self) -> Option<&[GeoPoint]> {
        self.saved_correct_route.as_deref()
    }

    /// Clear diversion leftovers; used on start and stop.
    pub fn reset_diversion(&mut self) {
        self.wrong_route_origin = None;
        self.saved_correct_route = None;
    }
}

/// Polyline the simulated vehicle follows.
pub fn select_simulation_path<'a>(
    enabled: bool,
    wrong_route: bool,
    diversion: &'a [GeoPoint],
    saved: Option<&'a [GeoPoint]>,
    delivery: &'a [GeoPoint],
) -> &'a [GeoPoint] {
    if !enabled {
        return &[];
    }
    if wrong_route && is_traversable(diversion) {
        return diversion;
    }
    if !wrong_route {
        if let Some(saved) = saved.filter(|s| is_traversable(s)) {
            return saved;
        }
    }
    if is_traversable(delivery) {
        return delivery;
    }
    &[]
}

/// Polyline drawn as the official route. Never the diversion.
pub fn select_displayed_route<'a>(
    wrong_route: bool,
    recalculated: &'a [GeoPoint],
    saved: Option<&'a [GeoPoint]>,
    delivery: &'a [GeoPoint],
) -> &'a [GeoPoint] {
    if wrong_route {
        if is_traversable(recalculated) {
            recalculated
        } else {
            delivery
        }
    } else {
        match saved.filter(|s| is_traversable(s)) {
            Some(saved) => saved,
            None => delivery,
        }
    }
}

/// Serialisable view of the navigation state for a rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigationSnapshot {
    pub time_ms: u64,
    pub mode: SimulationMode,
    pub flags: SimulationFlags,
    pub sample: Option<SimulatedSample>,
    pub effective_location: Option<GeoPoint>,
    pub displayed_route: Polyline,
    /// Diversion the vehicle follows while diverted; for debug overlays only.
    pub diversion_route: Polyline,
    pub simulation_path_points: usize,
    pub progress_m: f64,
    pub total_length_m: f64,
    pub arrived: bool,
    pub selected_delivery: Option<String>,
    pub delivery_route_loading: bool,
}

impl NavigationSnapshot {
    /// Capture from a world built by [`crate::navigator::build_navigation_world`].
    pub fn capture(world: &World) -> Self {
        let clock = world.resource::<SimulationClock>();
        let controller = world.resource::<SimulationController>();
        let engine = world.resource::<SimulationEngine>();
        let state = world.resource::<NavigationState>();
        let delivery = world.resource::<DeliveryRoute>();
        let recalculation = world.resource::<RouteRecalculation>();
        let diversion = world.resource::<WrongRouteGenerator>();

        let displayed = select_displayed_route(
            controller.is_wrong_route(),
            recalculation.polyline(),
            state.saved_route(),
            delivery.polyline(),
        );
        let sample = engine.sample().copied();

        Self {
            time_ms: clock.now(),
            mode: controller.mode(),
            flags: controller.flags(),
            sample,
            effective_location: state.effective_location(controller.is_enabled(), sample.as_ref()),
            displayed_route: displayed.to_vec(),
            diversion_route: diversion.polyline().to_vec(),
            simulation_path_points: engine.path().len(),
            progress_m: engine.progress_m(),
            total_length_m: engine.total_length_m(),
            arrived: engine.has_arrived(),
            selected_delivery: state.selected_delivery.as_ref().map(|d| d.id.clone()),
            delivery_route_loading: delivery.is_loading(),
        }
    }
}
