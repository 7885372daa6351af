//! Navigation configuration: speeds, periods, routing backend.
//!
//! Loaded from JSON (every field optional) and overridable through the
//! builder methods; the CLI layers its flags on top.

use std::fs;
use std::path::{Path, PathBuf};

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::{BACK_OFFSET_METERS, DEFAULT_SPEED_KMH, DEFAULT_TICK_MS};
use crate::geo::GeoPoint;
use crate::recalculation::DEFAULT_RECALCULATION_INTERVAL_MS;
use crate::routing::{RouteProfile, RouteProviderKind};
use crate::wrong_route::DEFAULT_WRONG_DESTINATION;

pub const DEFAULT_HISTORY_CAPACITY: usize = 10_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Resource)]
#[serde(default)]
pub struct NavigationConfig {
    pub speed_kmh: f64,
    pub tick_ms: u64,
    pub back_offset_m: f64,
    pub recalculation_interval_ms: u64,
    /// Virtual delay between issuing a route request and applying its result.
    pub route_latency_ms: u64,
    pub wrong_destination: GeoPoint,
    pub profile: RouteProfile,
    pub provider: RouteProviderKind,
    /// Maximum number of samples kept in [`crate::telemetry::SampleHistory`].
    pub history_capacity: usize,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            speed_kmh: DEFAULT_SPEED_KMH,
            tick_ms: DEFAULT_TICK_MS,
            back_offset_m: BACK_OFFSET_METERS,
            recalculation_interval_ms: DEFAULT_RECALCULATION_INTERVAL_MS,
            route_latency_ms: 0,
            wrong_destination: DEFAULT_WRONG_DESTINATION,
            profile: RouteProfile::default(),
            provider: RouteProviderKind::default(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

impl NavigationConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.speed_kmh.is_finite() || self.speed_kmh <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "speed_kmh must be positive, got {}",
                self.speed_kmh
            )));
        }
        if self.tick_ms == 0 {
            return Err(ConfigError::Invalid("tick_ms must be > 0".to_string()));
        }
        if !self.back_offset_m.is_finite() || self.back_offset_m < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "back_offset_m must be >= 0, got {}",
                self.back_offset_m
            )));
        }
        if self.recalculation_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "recalculation_interval_ms must be > 0".to_string(),
            ));
        }
        if !self.wrong_destination.is_finite() {
            return Err(ConfigError::Invalid(
                "wrong_destination must have finite coordinates".to_string(),
            ));
        }
        self.provider.validate().map_err(ConfigError::Invalid)?;
        Ok(())
    }

    pub fn with_speed_kmh(mut self, speed_kmh: f64) -> Self {
        self.speed_kmh = speed_kmh;
        self
    }

    pub fn with_tick_ms(mut self, tick_ms: u64) -> Self {
        self.tick_ms = tick_ms;
        self
    }

    pub fn with_back_offset_m(mut self, back_offset_m: f64) -> Self {
        self.back_offset_m = back_offset_m;
        self
    }

    pub fn with_recalculation_interval_ms(mut self, interval_ms: u64) -> Self {
        self.recalculation_interval_ms = interval_ms;
        self
    }

    pub fn with_route_latency_ms(mut self, latency_ms: u64) -> Self {
        self.route_latency_ms = latency_ms;
        self
    }

    pub fn with_wrong_destination(mut self, destination: GeoPoint) -> Self {
        self.wrong_destination = destination;
        self
    }

    pub fn with_profile(mut self, profile: RouteProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_provider(mut self, provider: RouteProviderKind) -> Self {
        self.provider = provider;
        self
    }
}
