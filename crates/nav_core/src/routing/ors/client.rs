use reqwest::blocking::{Client, Response};
use reqwest::{header::CONTENT_TYPE, Url};

use crate::geo::{GeoPoint, Polyline};
use crate::routing::error::RouteFetchError;
use crate::routing::{RouteProfile, RouteProvider};

use crate::geocoding::Geocoder;

use super::parser::{check_content_type, parse_directions_body, parse_geocode_body};
use super::{coordinate_param, REQUEST_TIMEOUT};

fn build_client() -> Client {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .expect("failed to build ORS client")
}

/// Status and body of a response; 2xx bodies must be JSON.
fn read_response(response: Response) -> Result<(u16, String), RouteFetchError> {
    let status = response.status().as_u16();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = response.text()?;
    if (200..300).contains(&status) {
        check_content_type(content_type.as_deref(), &body)?;
    }
    Ok((status, body))
}

/// Blocking client for the OpenRouteService directions endpoint.
#[derive(Debug, Clone)]
pub struct OrsRouteProvider {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl OrsRouteProvider {
    /// Create a client for the given endpoint (e.g. `https://api.openrouteservice.org`).
    pub fn new(endpoint: &str, api_key: &str) -> Self {
        Self {
            client: build_client(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn directions_url(
        &self,
        start: GeoPoint,
        end: GeoPoint,
        profile: RouteProfile,
    ) -> Result<Url, RouteFetchError> {
        let base = format!("{}/v2/directions/{}", self.endpoint, profile.as_str());
        let mut url = Url::parse(&base).map_err(|err| {
            RouteFetchError::InvalidRequest(format!("failed to build ORS URL: {}", err))
        })?;
        url.query_pairs_mut()
            .append_pair("api_key", &self.api_key)
            .append_pair("start", &coordinate_param(start))
            .append_pair("end", &coordinate_param(end));
        Ok(url)
    }
}

impl RouteProvider for OrsRouteProvider {
    fn route(
        &self,
        start: GeoPoint,
        end: GeoPoint,
        profile: RouteProfile,
    ) -> Result<Polyline, RouteFetchError> {
        if !start.is_finite() || !end.is_finite() {
            return Err(RouteFetchError::InvalidRequest(
                "non-finite coordinate".to_string(),
            ));
        }
        let url = self.directions_url(start, end, profile)?;
        log::debug!("requesting ORS directions {} -> {}", coordinate_param(start), coordinate_param(end));

        let response = self.client.get(url).send()?;
        let (status, body) = read_response(response)?;
        parse_directions_body(status, &body)
    }
}

/// Blocking client for the OpenRouteService geocode search endpoint.
#[derive(Debug, Clone)]
pub struct OrsGeocoder {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl OrsGeocoder {
    pub fn new(endpoint: &str, api_key: &str) -> Self {
        Self {
            client: build_client(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Best match for `address`, `Ok(None)` when nothing matched.
    pub fn search(&self, address: &str) -> Result<Option<GeoPoint>, RouteFetchError> {
        let base = format!("{}/geocode/search", self.endpoint);
        let mut url = Url::parse(&base).map_err(|err| {
            RouteFetchError::InvalidRequest(format!("failed to build ORS URL: {}", err))
        })?;
        url.query_pairs_mut()
            .append_pair("api_key", &self.api_key)
            .append_pair("text", address);

        let response = self.client.get(url).send()?;
        let (status, body) = read_response(response)?;
        parse_geocode_body(status, &body)
    }
}

impl Geocoder for OrsGeocoder {
    fn geocode(&self, address: &str) -> Option<GeoPoint> {
        match self.search(address) {
            Ok(found) => {
                if found.is_none() {
                    log::warn!("[geocoding] no match for '{address}'");
                }
                found
            }
            Err(err) => {
                err.report("geocoding");
                None
            }
        }
    }
}
