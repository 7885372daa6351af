use bevy_ecs::prelude::{Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, EventSubject};
use crate::delivery_route::DeliveryRoute;
use crate::recalculation::RouteRecalculation;
use crate::routing::{RoutePurpose, RouteResponses};
use crate::wrong_route::WrongRouteGenerator;

/// Hands a completed route request back to the service that issued it.
pub fn route_fetched_system(
    event: Res<CurrentEvent>,
    mut responses: ResMut<RouteResponses>,
    mut delivery_route: ResMut<DeliveryRoute>,
    mut wrong_route: ResMut<WrongRouteGenerator>,
    mut recalculation: ResMut<RouteRecalculation>,
) {
    if event.0.kind != EventKind::RouteFetched {
        return;
    }
    let Some(EventSubject::Fetch(ticket)) = event.0.subject else {
        return;
    };
    let Some(response) = responses.take(ticket) else {
        log::debug!("no parked response for {ticket:?}");
        return;
    };

    match response.purpose {
        RoutePurpose::Delivery => {
            delivery_route.apply_response(response.generation, response.outcome);
        }
        RoutePurpose::WrongRoute => {
            wrong_route.apply_response(response.generation, response.outcome);
        }
        RoutePurpose::Recalculation => {
            recalculation.apply_response(response.generation, response.outcome);
        }
    }
}
