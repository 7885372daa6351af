#![allow(dead_code)]

use nav_core::config::NavigationConfig;
use nav_core::geo::{GeoPoint, Polyline};
use nav_core::navigator::Navigator;
use nav_core::routing::RouteFetchError;
use nav_core::test_helpers::{test_delivery, ScriptedRouteProvider, DRIVER_START};

/// Builds a [Navigator] backed by a [ScriptedRouteProvider] the test keeps a handle to.
#[derive(Debug, Default)]
pub struct TestNavigatorBuilder {
    config: NavigationConfig,
    script: Vec<Result<Polyline, RouteFetchError>>,
    driver_location: Option<GeoPoint>,
    with_delivery: bool,
}

impl TestNavigatorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: NavigationConfig) -> Self {
        self.config = config;
        self
    }

    /// Queue a provider answer; answers are consumed in request order.
    pub fn with_route(mut self, polyline: Polyline) -> Self {
        self.script.push(Ok(polyline));
        self
    }

    pub fn with_route_error(mut self, error: RouteFetchError) -> Self {
        self.script.push(Err(error));
        self
    }

    /// Driver at [DRIVER_START] with the standard delivery selected.
    pub fn with_driver_and_delivery(mut self) -> Self {
        self.driver_location = Some(DRIVER_START);
        self.with_delivery = true;
        self
    }

    pub fn build(self) -> (Navigator, ScriptedRouteProvider) {
        let provider = ScriptedRouteProvider::new();
        for outcome in self.script {
            match outcome {
                Ok(polyline) => provider.push_route(polyline),
                Err(error) => provider.push_error(error),
            };
        }
        let mut navigator = Navigator::with_provider(self.config, Box::new(provider.clone()));
        if let Some(location) = self.driver_location {
            navigator.update_driver_location(location);
        }
        if self.with_delivery {
            navigator.select_delivery(Some(test_delivery()));
        }
        navigator.settle();
        (navigator, provider)
    }
}
