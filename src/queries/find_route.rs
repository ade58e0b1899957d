use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::queries::_structs::{Location, Mode, RouteGeometry};

#[derive(Debug, thiserror::Error)]
pub enum RoutingError {
    #[error("Routing request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Raw response from the routing service. `code` is "Ok" on success; any
/// other value means the caller should fall back to a straight-line route.
#[derive(Debug, Deserialize)]
pub struct OsrmResponse {
    pub code: String,
    #[serde(default)]
    pub routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
pub struct OsrmRoute {
    pub distance: f64,
    pub duration: f64,
    pub geometry: RouteGeometry,
    #[serde(default)]
    pub legs: Vec<OsrmLeg>,
}

#[derive(Debug, Deserialize)]
pub struct OsrmLeg {
    #[serde(default)]
    pub steps: Vec<OsrmStep>,
}

#[derive(Debug, Deserialize)]
pub struct OsrmStep {
    #[serde(default)]
    pub distance: f64,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub maneuver: serde_json::Value,
    #[serde(default)]
    pub intersections: Vec<serde_json::Value>,
    #[serde(default)]
    pub geometry: serde_json::Value,
}

impl OsrmStep {
    /// Turn-by-turn text derived from the maneuver descriptor. The service
    /// provides type/modifier pairs, not prose.
    pub fn instruction(&self) -> String {
        let kind = self.maneuver.get("type").and_then(|v| v.as_str());
        let modifier = self.maneuver.get("modifier").and_then(|v| v.as_str());
        match (kind, modifier) {
            (Some(kind), Some(modifier)) => format!("{kind} {modifier}"),
            (Some(kind), None) => kind.to_string(),
            _ => "Continue".to_string(),
        }
    }
}

/// Client for the OSRM-compatible routing service.
pub struct RoutingService {
    client: reqwest::Client,
    base_url: String,
}

impl RoutingService {
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            base_url,
        }
    }

    /// Request a routed path with full geometry and turn-by-turn steps.
    /// Coordinates go on the wire as lng,lat pairs.
    pub async fn find_route(
        &self,
        start: &Location,
        end: &Location,
        mode: Mode,
    ) -> Result<OsrmResponse, RoutingError> {
        let url = format!(
            "{}/{}/{},{};{},{}?overview=full&geometries=geojson&steps=true&annotations=true",
            self.base_url,
            mode.profile(),
            start.lng,
            start.lat,
            end.lng,
            end.lat,
        );
        debug!("Requesting route: {}", url);

        let response = self.client.get(&url).send().await?;
        let body: OsrmResponse = response.json().await?;
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_instruction_from_maneuver() {
        let step: OsrmStep = serde_json::from_str(
            r#"{"distance": 120.0, "duration": 95.0, "name": "Baker Street",
                "mode": "walking",
                "maneuver": {"type": "turn", "modifier": "left"}}"#,
        )
        .unwrap();
        assert_eq!(step.instruction(), "turn left");

        let depart: OsrmStep =
            serde_json::from_str(r#"{"maneuver": {"type": "depart"}}"#).unwrap();
        assert_eq!(depart.instruction(), "depart");

        let bare: OsrmStep = serde_json::from_str("{}").unwrap();
        assert_eq!(bare.instruction(), "Continue");
    }

    #[test]
    fn response_parses_failure_codes_without_routes() {
        let body: OsrmResponse = serde_json::from_str(r#"{"code": "NoRoute"}"#).unwrap();
        assert_eq!(body.code, "NoRoute");
        assert!(body.routes.is_empty());
    }
}
