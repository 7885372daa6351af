use serde::Deserialize;

/// GeoJSON body returned by `/v2/directions/{profile}`.
#[derive(Debug, Deserialize)]
pub(crate) struct OrsDirectionsResponse {
    #[serde(default)]
    pub(crate) features: Vec<OrsFeature>,
    /// Either a plain string (`"Rate Limit Exceeded"`) or `{ code, message }`.
    pub(crate) error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrsFeature {
    pub(crate) geometry: OrsLineString,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrsLineString {
    /// `[lng, lat]` or `[lng, lat, elevation]`.
    pub(crate) coordinates: Vec<Vec<f64>>,
}

/// GeoJSON body returned by `/geocode/search`.
#[derive(Debug, Deserialize)]
pub(crate) struct OrsGeocodeResponse {
    #[serde(default)]
    pub(crate) features: Vec<OrsPointFeature>,
    pub(crate) error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrsPointFeature {
    pub(crate) geometry: OrsPoint,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrsPoint {
    /// `[lng, lat]`.
    pub(crate) coordinates: Vec<f64>,
}

/// Human-readable text of the `error` field, whatever its shape.
pub(crate) fn error_text(error: &serde_json::Value) -> String {
    match error {
        serde_json::Value::String(text) => text.clone(),
        serde_json::Value::Object(map) => map
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string()),
        other => other.to_string(),
    }
}
