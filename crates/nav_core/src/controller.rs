//! High-level simulation state: three independent flags and the mode derived
//! from them. Invalid transitions are absorbed as no-ops.

use std::fmt;

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationFlags {
    pub enabled: bool,
    pub paused: bool,
    pub wrong_route: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationMode {
    Off,
    Running,
    Paused,
    WrongRoute,
}

impl fmt::Display for SimulationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SimulationMode::Off => "off",
            SimulationMode::Running => "running",
            SimulationMode::Paused => "paused",
            SimulationMode::WrongRoute => "wrong_route",
        };
        f.write_str(name)
    }
}

/// Paused beats wrong route beats running.
pub fn mode_from_flags(flags: SimulationFlags) -> SimulationMode {
    if !flags.enabled {
        SimulationMode::Off
    } else if flags.paused {
        SimulationMode::Paused
    } else if flags.wrong_route {
        SimulationMode::WrongRoute
    } else {
        SimulationMode::Running
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Resource)]
pub struct SimulationController {
    flags: SimulationFlags,
}

impl SimulationController {
    pub fn flags(&self) -> SimulationFlags {
        self.flags
    }

    pub fn mode(&self) -> SimulationMode {
        mode_from_flags(self.flags)
    }

    pub fn is_enabled(&self) -> bool {
        self.flags.enabled
    }

    pub fn is_paused(&self) -> bool {
        self.flags.paused
    }

    pub fn is_wrong_route(&self) -> bool {
        self.flags.wrong_route
    }

    /// Always lands in normal running, whatever the prior state.
    pub fn start(&mut self) {
        self.set(SimulationFlags {
            enabled: true,
            paused: false,
            wrong_route: false,
        });
    }

    pub fn pause(&mut self) {
        if self.flags.enabled && !self.flags.paused {
            self.set(SimulationFlags {
                paused: true,
                ..self.flags
            });
        }
    }

    pub fn resume(&mut self) {
        if self.flags.enabled && self.flags.paused {
            self.set(SimulationFlags {
                paused: false,
                ..self.flags
            });
        }
    }

    /// Full reset.
    pub fn stop(&mut self) {
        self.set(SimulationFlags::default());
    }

    pub fn toggle_wrong_route(&mut self) {
        if self.flags.enabled {
            self.set(SimulationFlags {
                wrong_route: !self.flags.wrong_route,
                ..self.flags
            });
        }
    }

    fn set(&mut self, flags: SimulationFlags) {
        let before = self.mode();
        self.flags = flags;
        let after = self.mode();
        if before != after {
            log::info!("simulation mode {before} -> {after}");
        }
    }
}
