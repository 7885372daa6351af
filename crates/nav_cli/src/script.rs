//! Timed input scripts for `delivery-nav simulate`.
//!
//! A script is a JSON array of `{ "at_ms": u64, "input": NavigationInput }`,
//! for example `{ "at_ms": 2000, "input": { "type": "toggle_wrong_route" } }`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use nav_core::navigation::NavigationInput;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScriptedInput {
    pub at_ms: u64,
    pub input: NavigationInput,
}

/// Load a script and order it by time. Entries with equal times keep file order.
pub fn load_script(path: &Path) -> Result<Vec<ScriptedInput>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read script {}", path.display()))?;
    parse_script(&raw).with_context(|| format!("invalid script {}", path.display()))
}

pub fn parse_script(raw: &str) -> Result<Vec<ScriptedInput>> {
    let mut entries: Vec<ScriptedInput> = serde_json::from_str(raw)?;
    entries.sort_by_key(|entry| entry.at_ms);
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nav_core::geo::GeoPoint;

    #[test]
    fn script_is_sorted_by_time() {
        let raw = r#"[
            { "at_ms": 5000, "input": { "type": "toggle_wrong_route" } },
            { "at_ms": 0, "input": { "type": "driver_location", "value": { "latitude": -22.9, "longitude": -47.06 } } },
            { "at_ms": 0, "input": { "type": "start" } },
            { "at_ms": 1000, "input": { "type": "set_speed_kmh", "value": 50.0 } }
        ]"#;
        let script = parse_script(raw).expect("script");
        let times: Vec<u64> = script.iter().map(|e| e.at_ms).collect();
        assert_eq!(times, vec![0, 0, 1000, 5000]);
        assert_eq!(
            script[0].input,
            NavigationInput::DriverLocation(GeoPoint::new(-22.9, -47.06))
        );
        assert_eq!(script[1].input, NavigationInput::Start);
        assert_eq!(script[2].input, NavigationInput::SetSpeedKmh(50.0));
    }

    #[test]
    fn unknown_input_is_rejected() {
        let raw = r#"[{ "at_ms": 0, "input": { "type": "teleport" } }]"#;
        assert!(parse_script(raw).is_err());
    }
}
