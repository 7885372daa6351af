//! Periodic re-routing toward the real destination while the vehicle is off
//! the correct route. Keeps the last good route when a fetch fails.

use bevy_ecs::prelude::Resource;

use crate::clock::{EventKind, RepeatingTimer, SimulationClock, TimerHandle};
use crate::geo::{is_traversable, GeoPoint, Polyline};
use crate::routing::{RouteFetchError, RoutePurpose, RouteRequests};

pub const DEFAULT_RECALCULATION_INTERVAL_MS: u64 = 30_000;

#[derive(Debug, Clone, Resource)]
pub struct RouteRecalculation {
    enabled: bool,
    location: Option<GeoPoint>,
    destination: Option<GeoPoint>,
    generation: u64,
    polyline: Polyline,
    timer: RepeatingTimer,
}

impl Default for RouteRecalculation {
    fn default() -> Self {
        Self::new(DEFAULT_RECALCULATION_INTERVAL_MS)
    }
}

impl RouteRecalculation {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            enabled: false,
            location: None,
            destination: None,
            generation: 0,
            polyline: Vec::new(),
            timer: RepeatingTimer::new(EventKind::RecalculateRoute, interval_ms),
        }
    }

    /// Feed the current inputs.
    ///
    /// The location value is refreshed on every call and read when a fetch is
    /// issued; only its presence takes part in change detection, so a moving
    /// vehicle does not restart the cycle on every tick. Any change to
    /// `enabled`, location presence, or destination cancels the timer and
    /// invalidates requests in flight, then either clears the route or
    /// fetches immediately and re-arms the timer.
    pub fn set_inputs(
        &mut self,
        enabled: bool,
        location: Option<GeoPoint>,
        destination: Option<GeoPoint>,
        clock: &mut SimulationClock,
        requests: &mut RouteRequests,
    ) {
        let changed = self.enabled != enabled
            || self.location.is_some() != location.is_some()
            || self.destination != destination;
        self.location = location;
        if !changed {
            return;
        }
        self.enabled = enabled;
        self.destination = destination;
        self.generation += 1;
        self.timer.cancel(clock);

        if !self.inputs_valid() {
            if !self.polyline.is_empty() {
                log::debug!("[recalculation] inactive, clearing recalculated route");
                self.polyline.clear();
            }
            return;
        }

        self.issue(requests);
        self.timer.arm(clock);
    }

    /// Handle a `RecalculateRoute` firing. Returns `false` for stale firings.
    pub fn on_timer(
        &mut self,
        handle: TimerHandle,
        clock: &mut SimulationClock,
        requests: &mut RouteRequests,
    ) -> bool {
        if !self.timer.is_current(handle) {
            return false;
        }
        self.timer.rearm(clock);
        self.issue(requests);
        true
    }

    /// Apply a provider outcome. Only a route with at least two points
    /// replaces the current one. Returns `false` for stale responses.
    pub fn apply_response(
        &mut self,
        generation: u64,
        outcome: Result<Polyline, RouteFetchError>,
    ) -> bool {
        if generation != self.generation {
            log::debug!(
                "[recalculation] discarding stale response (generation {generation}, current {})",
                self.generation
            );
            return false;
        }
        match outcome {
            Ok(polyline) if is_traversable(&polyline) => {
                log::info!("[recalculation] correct route refreshed ({} points)", polyline.len());
                self.polyline = polyline;
            }
            Ok(polyline) => {
                log::debug!(
                    "[recalculation] ignoring degenerate route ({} points), keeping last one",
                    polyline.len()
                );
            }
            Err(err) => {
                err.report("recalculation");
            }
        }
        true
    }

    /// Cancel the timer on teardown.
    pub fn shutdown(&mut self, clock: &mut SimulationClock) {
        self.timer.cancel(clock);
        self.generation += 1;
    }

    pub fn polyline(&self) -> &[GeoPoint] {
        &self.polyline
    }

    pub fn is_active(&self) -> bool {
        self.timer.is_armed()
    }

    pub fn interval_ms(&self) -> u64 {
        self.timer.period_ms()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn inputs_valid(&self) -> bool {
        self.enabled && self.location.is_some() && self.destination.is_some()
    }

    fn issue(&self, requests: &mut RouteRequests) {
        if let (true, Some(location), Some(destination)) =
            (self.enabled, self.location, self.destination)
        {
            requests.issue(
                RoutePurpose::Recalculation,
                self.generation,
                location,
                destination,
            );
        }
    }
}
