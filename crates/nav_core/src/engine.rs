//! Simulation engine: advances a virtual vehicle along a polyline at a fixed
//! speed, one tick at a time.
//!
//! The engine is a plain state machine. It does not own a timer; the
//! navigation systems arm a [`crate::clock::RepeatingTimer`] while
//! [`SimulationEngine::is_ticking`] holds and call [`SimulationEngine::tick`]
//! on every firing. Each tick is computed from the previous tick's progress.

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::geo::{bearing_deg, interpolate, GeoPoint, Polyline};

pub mod segments;


pub use segments::{RouteSegments, Segment};

/// The marker is drawn this far behind true progress.
pub const BACK_OFFSET_METERS: f64 = 25.0;
pub const DEFAULT_SPEED_KMH: f64 = 35.0;
pub const DEFAULT_TICK_MS: u64 = 500;
pub const SAMPLE_ACCURACY_M: f64 = 5.0;
pub const SAMPLE_ALTITUDE_M: f64 = 0.0;

pub fn kmh_to_mps(speed_kmh: f64) -> f64 {
    speed_kmh * 1000.0 / 3600.0
}

/// One simulated position fix, superseded by the next tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulatedSample {
    pub position: GeoPoint,
    pub speed_mps: f64,
    /// Degrees clockwise from north, `[0, 360)`.
    pub heading_deg: f64,
    pub accuracy_m: f64,
    pub altitude_m: f64,
}

/// Desired engine configuration, recomputed by the orchestrator on every event.
#[derive(Debug, Clone, Copy)]
pub struct EngineInputs<'a> {
    pub enabled: bool,
    pub path: &'a [GeoPoint],
    pub speed_kmh: f64,
    pub tick_ms: u64,
    pub paused: bool,
}

impl<'a> EngineInputs<'a> {
    pub fn new(enabled: bool, path: &'a [GeoPoint]) -> Self {
        Self {
            enabled,
            path,
            speed_kmh: DEFAULT_SPEED_KMH,
            tick_ms: DEFAULT_TICK_MS,
            paused: false,
        }
    }

    pub fn with_speed_kmh(mut self, speed_kmh: f64) -> Self {
        self.speed_kmh = speed_kmh;
        self
    }

    pub fn with_tick_ms(mut self, tick_ms: u64) -> Self {
        self.tick_ms = tick_ms;
        self
    }

    pub fn with_paused(mut self, paused: bool) -> Self {
        self.paused = paused;
        self
    }
}

#[derive(Debug, Clone, Resource)]
pub struct SimulationEngine {
    back_offset_m: f64,
    enabled: bool,
    paused: bool,
    speed_kmh: f64,
    tick_ms: u64,
    path: Polyline,
    segments: RouteSegments,
    progress_m: f64,
    ticks: u64,
    sample: Option<SimulatedSample>,
}

impl Default for SimulationEngine {
    fn default() -> Self {
        Self::new(BACK_OFFSET_METERS)
    }
}

impl SimulationEngine {
    pub fn new(back_offset_m: f64) -> Self {
        Self {
            back_offset_m: back_offset_m.max(0.0),
            enabled: false,
            paused: false,
            speed_kmh: DEFAULT_SPEED_KMH,
            tick_ms: DEFAULT_TICK_MS,
            path: Vec::new(),
            segments: RouteSegments::default(),
            progress_m: 0.0,
            ticks: 0,
            sample: None,
        }
    }

    /// Apply new inputs. Progress restarts from the first point when the
    /// engine is (re)activated or when the path or speed changes while active.
    ///
    /// Returns `true` when the tick timer has to restart its period.
    pub fn update(&mut self, inputs: EngineInputs<'_>) -> bool {
        let path_changed = self.path.as_slice() != inputs.path;
        if path_changed {
            self.path = inputs.path.to_vec();
            self.segments = RouteSegments::build(&self.path);
        }

        let speed_changed = self.speed_kmh != inputs.speed_kmh;
        self.speed_kmh = inputs.speed_kmh;

        let tick_ms = inputs.tick_ms.max(1);
        let tick_changed = self.tick_ms != tick_ms;
        self.tick_ms = tick_ms;

        let paused_changed = self.paused != inputs.paused;
        self.paused = inputs.paused;

        let activated = inputs.enabled && !self.enabled;
        if self.enabled && !inputs.enabled {
            log::debug!("simulation engine deactivated at {:.1} m", self.progress_m);
            self.reset();
        }
        self.enabled = inputs.enabled;

        let restarted = self.enabled && (activated || path_changed || speed_changed);
        if restarted {
            self.reset();
            self.sample = self.initial_sample();
            log::debug!(
                "simulation engine restarted: {} segments, {:.1} m at {:.1} km/h",
                self.segments.len(),
                self.total_length_m(),
                self.speed_kmh
            );
        }

        restarted || (self.enabled && (tick_changed || paused_changed))
    }

    /// Advance one tick. Returns the new sample, or `None` when not ticking.
    pub fn tick(&mut self) -> Option<SimulatedSample> {
        if !self.is_ticking() {
            return None;
        }

        let total = self.total_length_m();
        let step = self.speed_mps() * (self.tick_ms as f64 / 1000.0);
        // Halts at the destination rather than looping.
        self.progress_m = (self.progress_m + step).min(total);

        let display = self.display_progress_m();
        let segment = *self.segments.locate(display)?;
        let t = if segment.length_m > 0.0 {
            ((display - segment.cumulative_start_m) / segment.length_m).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let sample = SimulatedSample {
            position: interpolate(segment.from, segment.to, t),
            speed_mps: self.speed_mps(),
            heading_deg: bearing_deg(segment.from, segment.to),
            accuracy_m: SAMPLE_ACCURACY_M,
            altitude_m: SAMPLE_ALTITUDE_M,
        };
        self.ticks += 1;
        self.sample = Some(sample);
        Some(sample)
    }

    /// Current output: the latest sample while enabled, otherwise nothing.
    pub fn sample(&self) -> Option<&SimulatedSample> {
        if self.enabled {
            self.sample.as_ref()
        } else {
            None
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Whether the tick timer should be running.
    pub fn is_ticking(&self) -> bool {
        self.enabled && !self.paused && self.total_length_m() > 0.0
    }

    pub fn has_arrived(&self) -> bool {
        let total = self.total_length_m();
        total > 0.0 && self.progress_m >= total
    }

    pub fn progress_m(&self) -> f64 {
        self.progress_m
    }

    pub fn display_progress_m(&self) -> f64 {
        (self.progress_m - self.back_offset_m).clamp(0.0, self.total_length_m())
    }

    pub fn total_length_m(&self) -> f64 {
        self.segments.total_length_m()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn tick_ms(&self) -> u64 {
        self.tick_ms
    }

    pub fn speed_kmh(&self) -> f64 {
        self.speed_kmh
    }

    pub fn speed_mps(&self) -> f64 {
        kmh_to_mps(self.speed_kmh)
    }

    pub fn path(&self) -> &[GeoPoint] {
        &self.path
    }

    pub fn segments(&self) -> &RouteSegments {
        &self.segments
    }

    fn reset(&mut self) {
        self.progress_m = 0.0;
        self.ticks = 0;
        self.sample = None;
    }

    /// Sample at the first point of the path, heading along the first segment.
    fn initial_sample(&self) -> Option<SimulatedSample> {
        let first = self.segments.first()?;
        let position = *self.path.first()?;
        Some(SimulatedSample {
            position,
            speed_mps: self.speed_mps(),
            heading_deg: bearing_deg(first.from, first.to),
            accuracy_m: SAMPLE_ACCURACY_M,
            altitude_m: SAMPLE_ALTITUDE_M,
        })
    }
}
