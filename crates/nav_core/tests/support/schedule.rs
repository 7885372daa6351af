#![allow(dead_code)]

use bevy_ecs::prelude::World;
use bevy_ecs::schedule::Schedule;
use nav_core::clock::SimulationClock;
use nav_core::runner::{navigation_schedule, run_next_event, run_until, run_until_empty};

/// Steps a bare navigation world through the full schedule, for tests that
/// build their world by hand instead of going through a `Navigator`.
pub struct ScheduleRunner {
    schedule: Schedule,
}

impl Default for ScheduleRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ScheduleRunner {
    pub fn new() -> Self {
        Self {
            schedule: navigation_schedule(),
        }
    }

    /// `false` once the clock has nothing left.
    pub fn run_one(&mut self, world: &mut World) -> bool {
        run_next_event(world, &mut self.schedule)
    }

    pub fn run_until(&mut self, world: &mut World, until_ms: u64) -> usize {
        run_until(world, &mut self.schedule, until_ms)
    }

    pub fn run_until_empty(&mut self, world: &mut World, max_steps: usize) -> usize {
        run_until_empty(world, &mut self.schedule, max_steps)
    }

    pub fn now(world: &World) -> u64 {
        world.resource::<SimulationClock>().now()
    }
}
