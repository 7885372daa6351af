mod support;

use nav_core::config::NavigationConfig;
use nav_core::controller::SimulationMode;
use nav_core::geo::{distance_m, GeoPoint};
use nav_core::routing::RouteFetchError;
use nav_core::test_helpers::{short_path, DELIVERY_STOP, DRIVER_START, PATH_END};
use nav_core::wrong_route::DEFAULT_WRONG_DESTINATION;
use support::navigator::TestNavigatorBuilder;

const DIVERSION_END: GeoPoint = DEFAULT_WRONG_DESTINATION;
const RECALC_START: GeoPoint = GeoPoint::new(-22.9001, -47.0601);

fn diversion() -> Vec<GeoPoint> {
    vec![DRIVER_START, GeoPoint::new(-22.902, -47.061), DIVERSION_END]
}

fn recalculated() -> Vec<GeoPoint> {
    vec![RECALC_START, DELIVERY_STOP]
}

#[test]
fn start_emits_first_point_then_ticks_every_half_second() {
    let (mut navigator, provider) = TestNavigatorBuilder::new()
        .with_route(short_path())
        .with_driver_and_delivery()
        .build();
    assert_eq!(provider.call_count(), 1);
    assert_eq!(provider.calls()[0].start, DRIVER_START);
    assert_eq!(provider.calls()[0].end, DELIVERY_STOP);

    navigator.start();
    navigator.settle();
    let snapshot = navigator.snapshot();
    assert_eq!(snapshot.mode, SimulationMode::Running);
    assert_eq!(snapshot.sample.map(|s| s.position), Some(DRIVER_START));
    assert_eq!(snapshot.displayed_route, short_path());

    navigator.advance_by(1_000);
    let times: Vec<u64> = navigator.history().iter().map(|s| s.time_ms).collect();
    assert_eq!(times, vec![500, 1_000]);
}

#[test]
fn pause_freezes_sample_and_resume_continues() {
    let (mut navigator, _) = TestNavigatorBuilder::new()
        .with_route(short_path())
        .with_driver_and_delivery()
        .build();
    navigator.start();
    navigator.advance_by(6_000);

    navigator.pause();
    navigator.settle();
    let frozen = navigator.snapshot();
    assert_eq!(frozen.mode, SimulationMode::Paused);
    let ticks = navigator.history().len();

    navigator.advance_by(10_000);
    let later = navigator.snapshot();
    assert_eq!(later.sample, frozen.sample);
    assert_eq!(later.progress_m, frozen.progress_m);
    assert_eq!(later.effective_location, frozen.effective_location);
    assert_eq!(navigator.history().len(), ticks);

    navigator.resume();
    navigator.advance_by(500);
    let resumed = navigator.snapshot();
    let step = 35.0 / 3.6 * 0.5;
    assert!((resumed.progress_m - (frozen.progress_m + step)).abs() < 1e-9);
}

#[test]
fn stop_then_start_restarts_at_first_point() {
    let (mut navigator, provider) = TestNavigatorBuilder::new()
        .with_route(short_path())
        .with_driver_and_delivery()
        .build();
    navigator.start();
    navigator.advance_by(20_000);
    assert!(navigator.snapshot().progress_m > 100.0);

    navigator.stop();
    navigator.settle();
    let stopped = navigator.snapshot();
    assert_eq!(stopped.mode, SimulationMode::Off);
    assert_eq!(stopped.sample, None);
    assert_eq!(stopped.effective_location, Some(DRIVER_START));

    navigator.start();
    navigator.settle();
    let restarted = navigator.snapshot();
    assert_eq!(restarted.progress_m, 0.0);
    assert_eq!(restarted.sample.map(|s| s.position), Some(DRIVER_START));
    // Same origin and delivery: the route is not fetched again.
    assert_eq!(provider.call_count(), 1);
}

#[test]
fn wrong_route_follows_diversion_and_displays_recalculated_route() {
    let (mut navigator, provider) = TestNavigatorBuilder::new()
        .with_route(short_path())
        .with_route(diversion())
        .with_route(recalculated())
        .with_driver_and_delivery()
        .build();
    navigator.start();
    navigator.advance_by(2_000);
    let origin = navigator.snapshot().sample.expect("sample").position;

    navigator.toggle_wrong_route();
    navigator.settle();

    let calls = provider.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[1].start, origin);
    assert_eq!(calls[1].end, DIVERSION_END);
    assert_eq!(calls[2].end, DELIVERY_STOP);

    let snapshot = navigator.snapshot();
    assert_eq!(snapshot.mode, SimulationMode::WrongRoute);
    assert_eq!(snapshot.diversion_route, diversion());
    assert_eq!(snapshot.simulation_path_points, diversion().len());
    assert_eq!(snapshot.progress_m, 0.0);
    assert_eq!(snapshot.sample.map(|s| s.position), Some(DRIVER_START));
    assert_eq!(snapshot.displayed_route, recalculated());

    // Leaving the diversion follows the corrected route from its start.
    navigator.advance_by(1_000);
    navigator.toggle_wrong_route();
    navigator.settle();
    let back = navigator.snapshot();
    assert_eq!(back.mode, SimulationMode::Running);
    assert!(back.diversion_route.is_empty());
    assert_eq!(back.displayed_route, recalculated());
    assert_eq!(back.simulation_path_points, 2);
    assert_eq!(back.sample.map(|s| s.position), Some(RECALC_START));
}

#[test]
fn failed_recalculation_keeps_previous_route() {
    let (mut navigator, provider) = TestNavigatorBuilder::new()
        .with_route(short_path())
        .with_route(diversion())
        .with_route(recalculated())
        .with_route_error(RouteFetchError::Transport("network down".to_string()))
        .with_driver_and_delivery()
        .build();
    navigator.start();
    navigator.settle();
    navigator.toggle_wrong_route();
    navigator.settle();
    assert_eq!(navigator.snapshot().displayed_route, recalculated());

    navigator.advance_by(30_000);
    assert_eq!(provider.call_count(), 4);
    assert_eq!(navigator.snapshot().displayed_route, recalculated());
}

#[test]
fn recalculation_repeats_every_interval_from_current_position() {
    let config = NavigationConfig::default().with_recalculation_interval_ms(10_000);
    let (mut navigator, provider) = TestNavigatorBuilder::new()
        .with_config(config)
        .with_route(short_path())
        .with_route(diversion())
        .with_driver_and_delivery()
        .build();
    navigator.start();
    navigator.settle();
    navigator.toggle_wrong_route();
    navigator.advance_by(25_000);

    let recalc_calls: Vec<_> = provider
        .calls()
        .into_iter()
        .filter(|c| c.end == DELIVERY_STOP)
        .collect();
    // Delivery route, immediate recalculation, then at 10 s and 20 s.
    assert_eq!(recalc_calls.len(), 4);
    assert_ne!(recalc_calls[2].start, recalc_calls[3].start);
}

#[test]
fn toggle_without_any_location_yields_empty_diversion() {
    let (mut navigator, provider) = TestNavigatorBuilder::new().build();
    navigator.start();
    navigator.toggle_wrong_route();
    navigator.settle();

    let snapshot = navigator.snapshot();
    assert!(snapshot.flags.wrong_route);
    assert!(snapshot.diversion_route.is_empty());
    assert_eq!(snapshot.sample, None);
    assert_eq!(provider.call_count(), 0);
}

#[test]
fn toggle_while_off_does_nothing() {
    let (mut navigator, provider) = TestNavigatorBuilder::new()
        .with_route(short_path())
        .with_driver_and_delivery()
        .build();
    navigator.toggle_wrong_route();
    navigator.settle();
    assert_eq!(navigator.snapshot().mode, SimulationMode::Off);
    assert_eq!(provider.call_count(), 1);
}

#[test]
fn late_delivery_route_for_previous_selection_is_discarded() {
    let config = NavigationConfig::default().with_route_latency_ms(1_000);
    let first = vec![DRIVER_START, PATH_END];
    let second = vec![DRIVER_START, DELIVERY_STOP];
    let (mut navigator, _) = TestNavigatorBuilder::new()
        .with_config(config)
        .with_route(first)
        .with_route(second.clone())
        .with_driver_and_delivery()
        .build();

    navigator.advance_by(200);
    let other = nav_core::delivery_route::Delivery::new("delivery-2", Some(DELIVERY_STOP))
        .with_address("Av. Iguatemi, 777");
    navigator.select_delivery(Some(other));

    navigator.run_until(1_000);
    let snapshot = navigator.snapshot();
    assert!(snapshot.displayed_route.is_empty());
    assert!(snapshot.delivery_route_loading);

    navigator.run_until(1_200);
    assert_eq!(navigator.snapshot().displayed_route, second);
}

#[test]
fn route_origin_is_frozen_while_simulating() {
    let (mut navigator, provider) = TestNavigatorBuilder::new()
        .with_route(short_path())
        .with_driver_and_delivery()
        .build();
    navigator.start();
    navigator.settle();

    navigator.update_driver_location(GeoPoint::new(-22.95, -47.10));
    navigator.advance_by(1_000);
    assert_eq!(provider.call_count(), 1);

    // Back to live GPS once stopped.
    navigator.stop();
    navigator.settle();
    assert_eq!(provider.call_count(), 2);
    assert_eq!(provider.calls()[1].start, GeoPoint::new(-22.95, -47.10));
}

#[test]
fn speed_change_restarts_progress() {
    let (mut navigator, _) = TestNavigatorBuilder::new()
        .with_route(short_path())
        .with_driver_and_delivery()
        .build();
    navigator.start();
    navigator.advance_by(3_000);
    assert!(navigator.snapshot().progress_m > 0.0);

    navigator.set_speed_kmh(72.0);
    navigator.settle();
    assert_eq!(navigator.snapshot().progress_m, 0.0);

    navigator.advance_by(1_000);
    assert!((navigator.snapshot().progress_m - 20.0).abs() < 1e-9);
}

#[test]
fn shutdown_cancels_timers_and_ignores_inputs() {
    let (mut navigator, _) = TestNavigatorBuilder::new()
        .with_route(short_path())
        .with_route(diversion())
        .with_driver_and_delivery()
        .build();
    navigator.start();
    navigator.settle();
    navigator.toggle_wrong_route();
    navigator.advance_by(1_000);

    navigator.shutdown();
    assert!(navigator.is_shut_down());
    assert_eq!(navigator.advance_by(120_000), 0);

    navigator.start();
    navigator.settle();
    assert_eq!(navigator.snapshot().mode, SimulationMode::Off);
}

#[test]
fn marker_trails_destination_by_back_offset_on_arrival() {
    let config = NavigationConfig::default().with_speed_kmh(360.0);
    let (mut navigator, _) = TestNavigatorBuilder::new()
        .with_config(config)
        .with_route(short_path())
        .with_driver_and_delivery()
        .build();
    navigator.start();
    navigator.advance_by(60_000);

    let snapshot = navigator.snapshot();
    assert!(snapshot.arrived);
    let sample = snapshot.sample.expect("sample");
    assert!((distance_m(sample.position, PATH_END) - 25.0).abs() < 0.05);
}
