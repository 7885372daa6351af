//! Telemetry: the trail of simulated samples, for replay and export.

use std::collections::VecDeque;

use bevy_ecs::prelude::Resource;
use serde::Serialize;

use crate::config::DEFAULT_HISTORY_CAPACITY;
use crate::engine::SimulatedSample;

/// One emitted sample and the virtual time it was emitted at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimedSample {
    pub time_ms: u64,
    #[serde(flatten)]
    pub sample: SimulatedSample,
}

/// Bounded history of emitted samples; the oldest entries are dropped first.
#[derive(Debug, Clone, Resource)]
pub struct SampleHistory {
    capacity: usize,
    samples: VecDeque<TimedSample>,
}

impl Default for SampleHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl SampleHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            samples: VecDeque::new(),
        }
    }

    pub fn record(&mut self, time_ms: u64, sample: SimulatedSample) {
        if self.capacity == 0 {
            return;
        }
        while self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(TimedSample { time_ms, sample });
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn last(&self) -> Option<&TimedSample> {
        self.samples.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimedSample> {
        self.samples.iter()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
