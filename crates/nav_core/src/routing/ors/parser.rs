use crate::geo::{GeoPoint, Polyline};
use crate::routing::error::{RouteFetchError, RATE_LIMIT_MESSAGE};

use super::response::{error_text, OrsDirectionsResponse, OrsGeocodeResponse};

/// Longest body excerpt carried in an error.
const BODY_SNIPPET_CHARS: usize = 200;

pub(crate) fn body_snippet(body: &str) -> String {
    body.chars().take(BODY_SNIPPET_CHARS).collect()
}

#[cfg_attr(not(feature = "ors"), allow(dead_code))]
/// Reject 2xx bodies that are not JSON (captive portals, HTML error pages).
pub(crate) fn check_content_type(content_type: Option<&str>, body: &str) -> Result<(), RouteFetchError> {
    match content_type {
        Some(ct) if !ct.to_ascii_lowercase().contains("json") => Err(RouteFetchError::Malformed(
            format!("unexpected content-type {ct}: {}", body_snippet(body)),
        )),
        _ => Ok(()),
    }
}

/// Classify non-2xx statuses and provider `error` fields.
fn check_status(
    status: u16,
    body: &str,
    error: Option<&serde_json::Value>,
) -> Result<(), RouteFetchError> {
    let text = error.map(error_text);
    if text.as_deref() == Some(RATE_LIMIT_MESSAGE) || status == 429 {
        return Err(RouteFetchError::RateLimited);
    }
    if !(200..300).contains(&status) {
        return Err(RouteFetchError::Status {
            status,
            body: body_snippet(body),
        });
    }
    match text {
        Some(text) => Err(RouteFetchError::Status { status, body: text }),
        None => Ok(()),
    }
}

/// Map a raw directions response to a polyline in `{latitude, longitude}` order.
pub(crate) fn parse_directions_body(status: u16, body: &str) -> Result<Polyline, RouteFetchError> {
    let parsed = serde_json::from_str::<OrsDirectionsResponse>(body);
    if !(200..300).contains(&status) {
        let error = parsed.as_ref().ok().and_then(|r| r.error.as_ref());
        check_status(status, body, error)?;
    }
    let response = parsed?;
    check_status(status, body, response.error.as_ref())?;

    let feature = response
        .features
        .into_iter()
        .next()
        .ok_or(RouteFetchError::NoRoute)?;

    let points = feature
        .geometry
        .coordinates
        .iter()
        .map(|c| match c.as_slice() {
            [lng, lat, ..] => {
                let point = GeoPoint::from_lng_lat([*lng, *lat]);
                if point.is_finite() {
                    Ok(point)
                } else {
                    Err(RouteFetchError::Malformed("non-finite coordinate".to_string()))
                }
            }
            _ => Err(RouteFetchError::Malformed(format!(
                "coordinate with {} components",
                c.len()
            ))),
        })
        .collect::<Result<Polyline, _>>()?;

    if points.len() < 2 {
        return Err(RouteFetchError::NoRoute);
    }
    Ok(points)
}

#[cfg_attr(not(feature = "ors"), allow(dead_code))]
/// Map a raw geocode search response to its best match. `Ok(None)` means the
/// provider answered but found nothing.
pub(crate) fn parse_geocode_body(status: u16, body: &str) -> Result<Option<GeoPoint>, RouteFetchError> {
    let parsed = serde_json::from_str::<OrsGeocodeResponse>(body);
    if !(200..300).contains(&status) {
        let error = parsed.as_ref().ok().and_then(|r| r.error.as_ref());
        check_status(status, body, error)?;
    }
    let response = parsed?;
    check_status(status, body, response.error.as_ref())?;

    let Some(feature) = response.features.into_iter().next() else {
        return Ok(None);
    };
    match feature.geometry.coordinates.as_slice() {
        [lng, lat, ..] => {
            let point = GeoPoint::from_lng_lat([*lng, *lat]);
            if point.is_finite() {
                Ok(Some(point))
            } else {
                Err(RouteFetchError::Malformed("non-finite coordinate".to_string()))
            }
        }
        other => Err(RouteFetchError::Malformed(format!(
            "point with {} components",
            other.len()
        ))),
    }
}
