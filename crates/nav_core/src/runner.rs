//! Navigation runner: advances the clock and routes events into the ECS.
//!
//! Clock progression and event routing happen here, outside systems. Each step
//! pops the next event from [SimulationClock], inserts it as [CurrentEvent],
//! then runs the schedule: the system reacting to the event, the reconcile
//! chain, and finally route dispatch.

use bevy_ecs::prelude::{Res, Schedule, World};
use bevy_ecs::schedule::IntoSystemConfigs;

use crate::clock::{CurrentEvent, Event, EventKind, SimulationClock};
use crate::systems::{
    input::input_system,
    recalculate_route::recalculate_route_system,
    reconcile::{
        delivery_route_sync_system, engine_sync_system, recalculation_sync_system,
        route_origin_system, save_corrected_route_system, wrong_route_sync_system,
    },
    route_dispatch::route_dispatch_system,
    route_fetched::route_fetched_system,
    simulation_tick::simulation_tick_system,
};

fn is_input_received(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::InputReceived)
        .unwrap_or(false)
}

fn is_simulation_tick(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::SimulationTick)
        .unwrap_or(false)
}

fn is_recalculate_route(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::RecalculateRoute)
        .unwrap_or(false)
}

fn is_route_fetched(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::RouteFetched)
        .unwrap_or(false)
}

/// Runs one step: pops the next event, inserts it as [CurrentEvent], then runs the schedule.
/// Returns `true` if an event was processed, `false` if the clock was empty.
pub fn run_next_event(world: &mut World, schedule: &mut Schedule) -> bool {
    let event = match world.resource_mut::<SimulationClock>().pop_next() {
        Some(e) => e,
        None => return false,
    };
    world.insert_resource(CurrentEvent(event));
    schedule.run(world);
    true
}

/// Runs one step and invokes `hook` after the schedule completes.
pub fn run_next_event_with_hook<F>(world: &mut World, schedule: &mut Schedule, mut hook: F) -> bool
where
    F: FnMut(&World, &Event),
{
    let event = match world.resource_mut::<SimulationClock>().pop_next() {
        Some(e) => e,
        None => return false,
    };
    world.insert_resource(CurrentEvent(event));
    schedule.run(world);
    hook(world, &event);
    true
}

/// Processes every event due at or before `until_ms`, then moves the clock to
/// `until_ms`. Returns the number of events processed.
pub fn run_until(world: &mut World, schedule: &mut Schedule, until_ms: u64) -> usize {
    run_until_with_hook(world, schedule, until_ms, |_, _| {})
}

/// Like [run_until], invoking `hook` after each event.
pub fn run_until_with_hook<F>(
    world: &mut World,
    schedule: &mut Schedule,
    until_ms: u64,
    mut hook: F,
) -> usize
where
    F: FnMut(&World, &Event),
{
    let mut steps = 0;
    loop {
        let next = world.resource_mut::<SimulationClock>().next_event_time();
        match next {
            Some(ts) if ts <= until_ms => {
                run_next_event_with_hook(world, schedule, &mut hook);
                steps += 1;
            }
            _ => break,
        }
    }
    world.resource_mut::<SimulationClock>().advance_to(until_ms);
    steps
}

/// Runs steps until the event queue is empty or `max_steps` is reached.
/// Returns the number of steps executed. A running simulation never drains
/// its queue on its own, so `max_steps` is the usual stop condition.
pub fn run_until_empty(world: &mut World, schedule: &mut Schedule, max_steps: usize) -> usize {
    let mut steps = 0;
    while steps < max_steps && run_next_event(world, schedule) {
        steps += 1;
    }
    steps
}

/// Builds the navigation schedule: event systems gated on the event kind, then
/// the reconcile chain, then route dispatch.
pub fn navigation_schedule() -> Schedule {
    let mut schedule = Schedule::default();

    schedule.add_systems(
        (
            (
                // InputReceived
                input_system.run_if(is_input_received),
                // SimulationTick
                simulation_tick_system.run_if(is_simulation_tick),
                // RecalculateRoute
                recalculate_route_system.run_if(is_recalculate_route),
                // RouteFetched
                route_fetched_system.run_if(is_route_fetched),
            ),
            (
                route_origin_system,
                delivery_route_sync_system,
                wrong_route_sync_system,
                save_corrected_route_system,
                engine_sync_system,
                recalculation_sync_system,
            )
                .chain(),
            route_dispatch_system,
        )
            .chain(),
    );

    schedule
}
