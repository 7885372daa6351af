//! Performance benchmarks for nav_core using Criterion.rs.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nav_core::config::NavigationConfig;
use nav_core::engine::{EngineInputs, RouteSegments, SimulationEngine};
use nav_core::geo::{GeoPoint, Polyline};
use nav_core::navigator::Navigator;
use nav_core::routing::{RouteProfile, RouteProvider, StraightLineRouteProvider};
use nav_core::test_helpers::{test_delivery, ScriptedRouteProvider, DELIVERY_STOP, DRIVER_START};

/// Densified chord from the driver start to the delivery stop.
fn dense_path(spacing_m: f64) -> Polyline {
    StraightLineRouteProvider { spacing_m }
        .route(DRIVER_START, DELIVERY_STOP, RouteProfile::DrivingCar)
        .unwrap_or_else(|_| vec![DRIVER_START, DELIVERY_STOP])
}

fn bench_segment_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("segment_build");
    for spacing_m in [50.0, 10.0, 1.0] {
        let path = dense_path(spacing_m);
        group.bench_with_input(BenchmarkId::from_parameter(path.len()), &path, |b, path| {
            b.iter(|| black_box(RouteSegments::build(path)));
        });
    }
    group.finish();
}

fn bench_engine_ticks(c: &mut Criterion) {
    let path = dense_path(5.0);
    c.bench_function("engine_1000_ticks", |b| {
        b.iter(|| {
            let mut engine = SimulationEngine::default();
            engine.update(EngineInputs::new(true, &path).with_speed_kmh(60.0));
            for _ in 0..1_000 {
                black_box(engine.tick());
            }
        });
    });
}

fn bench_navigation_drive(c: &mut Criterion) {
    let path = dense_path(10.0);
    let mut group = c.benchmark_group("navigation_drive");
    for minutes in [1u64, 10] {
        group.bench_with_input(BenchmarkId::from_parameter(minutes), &minutes, |b, &minutes| {
            b.iter(|| {
                let provider = ScriptedRouteProvider::new();
                provider.push_route(path.clone());
                let mut navigator =
                    Navigator::with_provider(NavigationConfig::default(), Box::new(provider));
                navigator.update_driver_location(DRIVER_START);
                navigator.select_delivery(Some(test_delivery()));
                navigator.start();
                navigator.toggle_wrong_route();
                black_box(navigator.advance_by(minutes * 60_000));
            });
        });
    }
    group.finish();
}

fn bench_geo(c: &mut Criterion) {
    let far = GeoPoint::new(-23.5505, -46.6333);
    c.bench_function("haversine_distance", |b| {
        b.iter(|| black_box(nav_core::geo::distance_m(black_box(DRIVER_START), black_box(far))));
    });
}

criterion_group!(
    benches,
    bench_segment_build,
    bench_engine_ticks,
    bench_navigation_drive,
    bench_geo
);
criterion_main!(benches);
