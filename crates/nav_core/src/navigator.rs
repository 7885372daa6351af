//! Owning facade over the navigation world and schedule.
//!
//! Inputs are queued and applied at the current virtual time; time only moves
//! when the caller advances it.

use bevy_ecs::prelude::{Schedule, World};
use bevy_ecs::world::Mut;

use crate::clock::{Event, EventKind, RepeatingTimer, SimulationClock};
use crate::config::NavigationConfig;
use crate::controller::SimulationController;
use crate::delivery_route::{Delivery, DeliveryRoute};
use crate::engine::SimulationEngine;
use crate::geo::GeoPoint;
use crate::navigation::{
    EngineTickTimer, NavigationInput, NavigationSnapshot, NavigationState, PendingInputs,
};
use crate::recalculation::RouteRecalculation;
use crate::routing::{
    build_route_provider, RouteProvider, RouteProviderResource, RouteRequests, RouteResponses,
};
use crate::runner::{navigation_schedule, run_until, run_until_with_hook};
use crate::telemetry::SampleHistory;
use crate::wrong_route::WrongRouteGenerator;

/// Insert every resource the navigation schedule reads.
pub fn build_navigation_world(
    config: &NavigationConfig,
    provider: Box<dyn RouteProvider>,
) -> World {
    let mut world = World::new();
    world.insert_resource(SimulationClock::default());
    world.insert_resource(config.clone());
    world.insert_resource(RouteProviderResource(provider));
    world.insert_resource(RouteRequests::default());
    world.insert_resource(RouteResponses::default());
    world.insert_resource(PendingInputs::default());
    world.insert_resource(SimulationController::default());
    world.insert_resource(NavigationState::default());
    world.insert_resource(SimulationEngine::new(config.back_offset_m));
    world.insert_resource(EngineTickTimer(RepeatingTimer::new(
        EventKind::SimulationTick,
        config.tick_ms,
    )));
    world.insert_resource(RouteRecalculation::new(config.recalculation_interval_ms));
    world.insert_resource(WrongRouteGenerator::new(config.wrong_destination));
    world.insert_resource(DeliveryRoute::default());
    world.insert_resource(SampleHistory::with_capacity(config.history_capacity));
    world
}

pub struct Navigator {
    world: World,
    schedule: Schedule,
    shut_down: bool,
}

impl Navigator {
    /// Build with the provider described by `config.provider`.
    pub fn new(config: NavigationConfig) -> Self {
        let provider = build_route_provider(&config.provider);
        Self::with_provider(config, provider)
    }

    pub fn with_provider(config: NavigationConfig, provider: Box<dyn RouteProvider>) -> Self {
        log::info!(
            "navigator ready: {:.1} km/h, tick {} ms, recalculation every {} ms, profile {}",
            config.speed_kmh,
            config.tick_ms,
            config.recalculation_interval_ms,
            config.profile
        );
        Self {
            world: build_navigation_world(&config, provider),
            schedule: navigation_schedule(),
            shut_down: false,
        }
    }

    /// Queue an input; it is applied at the current time on the next advance.
    pub fn submit(&mut self, input: NavigationInput) {
        if self.shut_down {
            log::warn!("navigator is shut down, ignoring {input:?}");
            return;
        }
        self.world.resource_mut::<PendingInputs>().0.push_back(input);
        self.world
            .resource_mut::<SimulationClock>()
            .schedule_in(0, EventKind::InputReceived, None);
    }

    pub fn start(&mut self) {
        self.submit(NavigationInput::Start);
    }

    pub fn pause(&mut self) {
        self.submit(NavigationInput::Pause);
    }

    pub fn resume(&mut self) {
        self.submit(NavigationInput::Resume);
    }

    pub fn stop(&mut self) {
        self.submit(NavigationInput::Stop);
    }

    pub fn toggle_wrong_route(&mut self) {
        self.submit(NavigationInput::ToggleWrongRoute);
    }

    pub fn update_driver_location(&mut self, location: GeoPoint) {
        self.submit(NavigationInput::DriverLocation(location));
    }

    pub fn select_delivery(&mut self, delivery: Option<Delivery>) {
        self.submit(NavigationInput::SelectDelivery(delivery));
    }

    pub fn clear_delivery_route(&mut self) {
        self.submit(NavigationInput::ClearDeliveryRoute);
    }

    pub fn set_speed_kmh(&mut self, speed_kmh: f64) {
        self.submit(NavigationInput::SetSpeedKmh(speed_kmh));
    }

    pub fn now(&self) -> u64 {
        self.world.resource::<SimulationClock>().now()
    }

    /// Process everything due at the current time.
    pub fn settle(&mut self) -> usize {
        let now = self.now();
        self.run_until(now)
    }

    pub fn advance_by(&mut self, delta_ms: u64) -> usize {
        let until = self.now().saturating_add(delta_ms);
        self.run_until(until)
    }

    pub fn run_until(&mut self, until_ms: u64) -> usize {
        run_until(&mut self.world, &mut self.schedule, until_ms)
    }

    pub fn run_until_with_hook<F>(&mut self, until_ms: u64, hook: F) -> usize
    where
        F: FnMut(&World, &Event),
    {
        run_until_with_hook(&mut self.world, &mut self.schedule, until_ms, hook)
    }

    pub fn snapshot(&self) -> NavigationSnapshot {
        NavigationSnapshot::capture(&self.world)
    }

    pub fn history(&self) -> &SampleHistory {
        self.world.resource::<SampleHistory>()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Stop the simulation and drop every pending timer. Later inputs are ignored.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.world.resource_mut::<PendingInputs>().0.clear();
        self.stop();
        self.settle();
        self.shut_down = true;

        self.world.resource_scope(|world, mut recalculation: Mut<RouteRecalculation>| {
            let mut clock = world.resource_mut::<SimulationClock>();
            recalculation.shutdown(&mut clock);
        });
        self.world.resource_scope(|world, mut timer: Mut<EngineTickTimer>| {
            let mut clock = world.resource_mut::<SimulationClock>();
            timer.0.cancel(&mut clock);
        });
        self.world.resource_mut::<SimulationClock>().cancel_all_timers();
        log::info!("navigator shut down at {} ms", self.now());
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }
}
