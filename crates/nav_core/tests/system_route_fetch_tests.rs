mod support;

use bevy_ecs::prelude::Schedule;
use nav_core::clock::{CurrentEvent, EventKind, EventSubject, FetchTicket, SimulationClock};
use nav_core::config::NavigationConfig;
use nav_core::delivery_route::DeliveryRoute;
use nav_core::navigator::build_navigation_world;
use nav_core::routing::{RouteFetchError, RoutePurpose, RouteRequests, RouteResponses};
use nav_core::systems::route_dispatch::route_dispatch_system;
use nav_core::systems::route_fetched::route_fetched_system;
use nav_core::test_helpers::{short_path, test_delivery, ScriptedRouteProvider, DRIVER_START};
use support::schedule::ScheduleRunner;

#[test]
fn dispatch_parks_outcome_and_schedules_delivery_after_latency() {
    let provider = ScriptedRouteProvider::new();
    provider.push_error(RouteFetchError::NoRoute);
    let config = NavigationConfig::default().with_route_latency_ms(750);
    let mut world = build_navigation_world(&config, Box::new(provider.clone()));

    let ticket = world.resource_mut::<RouteRequests>().issue(
        RoutePurpose::Recalculation,
        3,
        DRIVER_START,
        test_delivery().location.expect("location"),
    );

    let mut schedule = Schedule::default();
    schedule.add_systems(route_dispatch_system);
    schedule.run(&mut world);

    assert_eq!(provider.call_count(), 1);
    assert!(world.resource::<RouteRequests>().is_empty());
    let parked = {
        let mut responses = world.resource_mut::<RouteResponses>();
        assert_eq!(responses.len(), 1);
        responses.take(ticket).expect("parked response")
    };
    assert_eq!(parked.purpose, RoutePurpose::Recalculation);
    assert_eq!(parked.generation, 3);
    assert_eq!(parked.outcome, Err(RouteFetchError::NoRoute));

    let mut clock = world.resource_mut::<SimulationClock>();
    let event = clock.pop_next().expect("route fetched event");
    assert_eq!(event.timestamp, 750);
    assert_eq!(event.kind, EventKind::RouteFetched);
    assert_eq!(event.subject, Some(EventSubject::Fetch(ticket)));
}

#[test]
fn fetched_route_goes_to_the_issuing_service() {
    let mut world = build_navigation_world(
        &NavigationConfig::default(),
        Box::new(ScriptedRouteProvider::new()),
    );
    let delivery = test_delivery();
    let ticket = {
        let mut requests = RouteRequests::default();
        let ticket = world
            .resource_mut::<DeliveryRoute>()
            .set_inputs(Some(DRIVER_START), Some(&delivery), &mut requests)
            .expect("request issued");
        let request = requests.drain().remove(0);
        world.resource_mut::<RouteResponses>().insert(
            ticket,
            nav_core::routing::RouteResponse {
                purpose: request.purpose,
                generation: request.generation,
                outcome: Ok(short_path()),
            },
        );
        ticket
    };

    world.insert_resource(CurrentEvent(nav_core::clock::Event {
        timestamp: 0,
        seq: 0,
        kind: EventKind::RouteFetched,
        subject: Some(EventSubject::Fetch(ticket)),
    }));
    let mut schedule = Schedule::default();
    schedule.add_systems(route_fetched_system);
    schedule.run(&mut world);

    assert_eq!(world.resource::<DeliveryRoute>().polyline(), short_path().as_slice());
    assert!(world.resource::<RouteResponses>().is_empty());
}

#[test]
fn unknown_ticket_is_ignored() {
    let mut world = build_navigation_world(
        &NavigationConfig::default(),
        Box::new(ScriptedRouteProvider::new()),
    );
    world
        .resource_mut::<SimulationClock>()
        .schedule_at(0, EventKind::RouteFetched, Some(EventSubject::Fetch(FetchTicket(99))));

    let mut runner = ScheduleRunner::new();
    assert!(runner.run_one(&mut world));
    assert!(world.resource::<DeliveryRoute>().polyline().is_empty());
}
