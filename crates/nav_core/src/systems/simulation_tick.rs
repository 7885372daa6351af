use bevy_ecs::prelude::{Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, EventSubject, SimulationClock};
use crate::engine::SimulationEngine;
use crate::navigation::{EngineTickTimer, NavigationState};
use crate::telemetry::SampleHistory;

pub fn simulation_tick_system(
    event: Res<CurrentEvent>,
    mut clock: ResMut<SimulationClock>,
    mut timer: ResMut<EngineTickTimer>,
    mut engine: ResMut<SimulationEngine>,
    mut state: ResMut<NavigationState>,
    history: Option<ResMut<SampleHistory>>,
) {
    if event.0.kind != EventKind::SimulationTick {
        return;
    }
    let Some(EventSubject::Timer(handle)) = event.0.subject else {
        return;
    };
    if !timer.0.is_current(handle) {
        return;
    }
    timer.0.rearm(&mut clock);

    let Some(sample) = engine.tick() else {
        return;
    };
    state.last_sample = Some(sample);
    if let Some(mut history) = history {
        history.record(clock.now(), sample);
    }
}
