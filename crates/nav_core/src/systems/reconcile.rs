//! Reconcile pass: after every event, recompute the derived inputs of each
//! service from the current state. Runs as a chain in the order declared by
//! [`crate::runner::navigation_schedule`].

use bevy_ecs::prelude::{Res, ResMut};

use crate::clock::SimulationClock;
use crate::config::NavigationConfig;
use crate::controller::SimulationController;
use crate::delivery_route::DeliveryRoute;
use crate::engine::{EngineInputs, SimulationEngine};
use crate::geo::is_traversable;
use crate::navigation::{select_simulation_path, EngineTickTimer, NavigationState};
use crate::recalculation::RouteRecalculation;
use crate::routing::RouteRequests;
use crate::wrong_route::WrongRouteGenerator;

pub fn route_origin_system(
    controller: Res<SimulationController>,
    mut state: ResMut<NavigationState>,
) {
    state.sync_route_origin(controller.is_enabled());
}

pub fn delivery_route_sync_system(
    controller: Res<SimulationController>,
    state: Res<NavigationState>,
    mut delivery_route: ResMut<DeliveryRoute>,
    mut requests: ResMut<RouteRequests>,
) {
    let origin = state.route_origin(controller.is_enabled());
    delivery_route.set_inputs(origin, state.selected_delivery.as_ref(), &mut requests);
}

pub fn wrong_route_sync_system(
    controller: Res<SimulationController>,
    state: Res<NavigationState>,
    mut wrong_route: ResMut<WrongRouteGenerator>,
    mut requests: ResMut<RouteRequests>,
) {
    let diverted = controller.is_enabled() && controller.is_wrong_route();
    wrong_route.set_inputs(diverted, state.wrong_route_origin, &mut requests);
}

/// While diverted, the latest recalculated route becomes the route to follow
/// once the diversion ends.
pub fn save_corrected_route_system(
    controller: Res<SimulationController>,
    recalculation: Res<RouteRecalculation>,
    mut state: ResMut<NavigationState>,
) {
    if !controller.is_wrong_route() || !is_traversable(recalculation.polyline()) {
        return;
    }
    if state.saved_route() != Some(recalculation.polyline()) {
        log::debug!(
            "saving corrected route ({} points)",
            recalculation.polyline().len()
        );
        state.saved_correct_route = Some(recalculation.polyline().to_vec());
    }
}

pub fn engine_sync_system(
    controller: Res<SimulationController>,
    config: Res<NavigationConfig>,
    wrong_route: Res<WrongRouteGenerator>,
    delivery_route: Res<DeliveryRoute>,
    mut state: ResMut<NavigationState>,
    mut engine: ResMut<SimulationEngine>,
    mut timer: ResMut<EngineTickTimer>,
    mut clock: ResMut<SimulationClock>,
) {
    let enabled = controller.is_enabled();
    let restart = {
        let path = select_simulation_path(
            enabled,
            controller.is_wrong_route(),
            wrong_route.polyline(),
            state.saved_route(),
            delivery_route.polyline(),
        );
        engine.update(
            EngineInputs::new(enabled && is_traversable(path), path)
                .with_speed_kmh(config.speed_kmh)
                .with_tick_ms(config.tick_ms)
                .with_paused(controller.is_paused()),
        )
    };

    let timer = &mut timer.0;
    if engine.is_ticking() {
        if restart || !timer.is_armed() {
            timer.set_period(engine.tick_ms(), &mut clock);
            timer.arm(&mut clock);
        }
    } else if timer.is_armed() {
        timer.cancel(&mut clock);
    }

    if !enabled {
        if state.last_sample.is_some() {
            state.last_sample = None;
        }
    } else if let Some(sample) = engine.sample().copied() {
        state.last_sample = Some(sample);
    }
}

pub fn recalculation_sync_system(
    controller: Res<SimulationController>,
    state: Res<NavigationState>,
    engine: Res<SimulationEngine>,
    mut recalculation: ResMut<RouteRecalculation>,
    mut clock: ResMut<SimulationClock>,
    mut requests: ResMut<RouteRequests>,
) {
    let enabled = controller.is_enabled() && controller.is_wrong_route();
    let location = engine
        .sample()
        .map(|s| s.position)
        .or(state.driver_location);
    recalculation.set_inputs(
        enabled,
        location,
        state.delivery_target(),
        &mut clock,
        &mut requests,
    );
}
