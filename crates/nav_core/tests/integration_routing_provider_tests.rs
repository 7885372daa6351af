use nav_core::geo::{distance_m, polyline_length_m, GeoPoint};
use nav_core::routing::{
    build_route_provider, fetch_polyline, RouteFetchError, RouteProfile, RouteProviderKind,
};
use nav_core::test_helpers::{ScriptedRouteProvider, DELIVERY_STOP, DRIVER_START};

#[test]
fn straight_line_provider_is_the_default() {
    let provider = build_route_provider(&RouteProviderKind::default());
    let route = provider
        .route(DRIVER_START, DELIVERY_STOP, RouteProfile::DrivingCar)
        .expect("route");

    assert_eq!(route.first(), Some(&DRIVER_START));
    assert_eq!(route.last(), Some(&DELIVERY_STOP));
    assert!(route.len() > 2);
    let chord = distance_m(DRIVER_START, DELIVERY_STOP);
    assert!((polyline_length_m(&route) - chord).abs() < 1.0);
}

#[test]
fn straight_line_provider_rejects_non_finite_points() {
    let provider = build_route_provider(&RouteProviderKind::StraightLine { spacing_m: 10.0 });
    let err = provider
        .route(
            GeoPoint::new(f64::NAN, -47.0),
            DELIVERY_STOP,
            RouteProfile::DrivingCar,
        )
        .unwrap_err();
    assert!(matches!(err, RouteFetchError::InvalidRequest(_)));
}

#[test]
fn fetch_polyline_absorbs_failures() {
    let provider = ScriptedRouteProvider::new();
    provider.push_error(RouteFetchError::RateLimited);
    let route = fetch_polyline(&provider, DRIVER_START, DELIVERY_STOP, RouteProfile::DrivingCar);
    assert!(route.is_empty());

    let route = fetch_polyline(&provider, DRIVER_START, DELIVERY_STOP, RouteProfile::FootWalking);
    assert_eq!(route, vec![DRIVER_START, DELIVERY_STOP]);
    assert_eq!(provider.calls()[1].profile, RouteProfile::FootWalking);
}

#[test]
fn provider_kind_reads_from_json() {
    let kind: RouteProviderKind =
        serde_json::from_str(r#"{ "kind": "straight_line", "spacing_m": 25.0 }"#).expect("kind");
    assert_eq!(kind, RouteProviderKind::StraightLine { spacing_m: 25.0 });
}
