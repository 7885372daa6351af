use bevy_ecs::prelude::{Res, ResMut};

use crate::clock::{CurrentEvent, EventKind};
use crate::config::NavigationConfig;
use crate::controller::SimulationController;
use crate::delivery_route::DeliveryRoute;
use crate::engine::SimulationEngine;
use crate::navigation::{NavigationInput, NavigationState, PendingInputs};

/// Applies the oldest pending input. Derived state is brought up to date by
/// the reconcile systems that run after it.
pub fn input_system(
    event: Res<CurrentEvent>,
    mut pending: ResMut<PendingInputs>,
    mut controller: ResMut<SimulationController>,
    mut state: ResMut<NavigationState>,
    mut delivery_route: ResMut<DeliveryRoute>,
    mut config: ResMut<NavigationConfig>,
    engine: Res<SimulationEngine>,
) {
    if event.0.kind != EventKind::InputReceived {
        return;
    }
    let Some(input) = pending.0.pop_front() else {
        return;
    };

    match input {
        NavigationInput::Start => {
            controller.start();
            state.reset_diversion();
        }
        NavigationInput::Pause => controller.pause(),
        NavigationInput::Resume => controller.resume(),
        NavigationInput::Stop => {
            controller.stop();
            state.reset_diversion();
            state.last_sample = None;
        }
        NavigationInput::ToggleWrongRoute => {
            if !controller.is_enabled() {
                log::warn!("cannot toggle wrong route while the simulation is off");
                return;
            }
            controller.toggle_wrong_route();
            let origin = if controller.is_wrong_route() {
                engine
                    .sample()
                    .or(state.last_sample.as_ref())
                    .map(|s| s.position)
                    .or(state.driver_location)
            } else {
                None
            };
            state.wrong_route_origin = origin;
        }
        NavigationInput::DriverLocation(location) => {
            if location.is_finite() {
                state.driver_location = Some(location);
            } else {
                log::warn!("ignoring non-finite driver location {location:?}");
            }
        }
        NavigationInput::SelectDelivery(delivery) => {
            if let Some(delivery) = &delivery {
                log::info!("selected delivery {}", delivery.id);
            }
            state.selected_delivery = delivery;
        }
        NavigationInput::ClearDeliveryRoute => delivery_route.clear(),
        NavigationInput::SetSpeedKmh(speed_kmh) => {
            if speed_kmh.is_finite() && speed_kmh > 0.0 {
                config.speed_kmh = speed_kmh;
            } else {
                log::warn!("ignoring invalid simulation speed {speed_kmh} km/h");
            }
        }
    }
}
