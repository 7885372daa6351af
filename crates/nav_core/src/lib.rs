pub mod clock;
pub mod config;
pub mod controller;
pub mod delivery_route;
pub mod engine;
pub mod geo;
pub mod geocoding;
pub mod navigation;
pub mod navigator;
pub mod recalculation;
pub mod routing;
pub mod runner;
pub mod systems;
pub mod telemetry;
pub mod wrong_route;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
