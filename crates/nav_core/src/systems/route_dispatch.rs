use bevy_ecs::prelude::{Res, ResMut};

use crate::clock::{EventKind, EventSubject, SimulationClock};
use crate::config::NavigationConfig;
use crate::routing::{RouteProviderResource, RouteRequests, RouteResponse, RouteResponses};

/// Executes the route requests issued during this event. Each outcome is
/// parked and delivered by a `RouteFetched` event `route_latency_ms` later.
pub fn route_dispatch_system(
    mut clock: ResMut<SimulationClock>,
    mut requests: ResMut<RouteRequests>,
    mut responses: ResMut<RouteResponses>,
    provider: Res<RouteProviderResource>,
    config: Res<NavigationConfig>,
) {
    if requests.is_empty() {
        return;
    }
    for request in requests.drain() {
        let outcome = provider.0.route(request.start, request.end, config.profile);
        log::debug!(
            "dispatched {:?} route request {:?} (generation {}): {}",
            request.purpose,
            request.ticket,
            request.generation,
            if outcome.is_ok() { "ok" } else { "failed" }
        );
        responses.insert(
            request.ticket,
            RouteResponse {
                purpose: request.purpose,
                generation: request.generation,
                outcome,
            },
        );
        clock.schedule_in(
            config.route_latency_ms,
            EventKind::RouteFetched,
            Some(EventSubject::Fetch(request.ticket)),
        );
    }
}
