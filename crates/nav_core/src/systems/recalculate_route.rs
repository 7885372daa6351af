use bevy_ecs::prelude::{Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, EventSubject, SimulationClock};
use crate::recalculation::RouteRecalculation;
use crate::routing::RouteRequests;

pub fn recalculate_route_system(
    event: Res<CurrentEvent>,
    mut clock: ResMut<SimulationClock>,
    mut recalculation: ResMut<RouteRecalculation>,
    mut requests: ResMut<RouteRequests>,
) {
    if event.0.kind != EventKind::RecalculateRoute {
        return;
    }
    let Some(EventSubject::Timer(handle)) = event.0.subject else {
        return;
    };
    if recalculation.on_timer(handle, &mut clock, &mut requests) {
        log::debug!("[recalculation] periodic refresh at {} ms", clock.now());
    }
}
