use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, error};

use crate::queries::_structs::Location;

/// Search radius around the origin, in meters.
pub const SEARCH_RADIUS_M: u32 = 10_000;

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Overpass request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Overpass API error: {status}")]
    BadStatus { status: u16 },
}

/// One tagged element from the geodata source. Coordinates come either
/// directly (nodes) or via the computed center (ways and relations).
#[derive(Debug, Clone, Deserialize)]
pub struct OverpassElement {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub center: Option<OverpassCenter>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct OverpassCenter {
    pub lat: f64,
    pub lon: f64,
}

impl OverpassElement {
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => self.center.map(|c| (c.lat, c.lon)),
        }
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

/// Client for the Overpass place-search API.
pub struct PlaceSearch {
    client: reqwest::Client,
    base_url: String,
}

impl PlaceSearch {
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            base_url,
        }
    }

    /// One bounded-radius query for amenity/shop/leisure elements (nodes,
    /// ways and relations) around the origin. Returns the raw tagged
    /// elements; normalization happens in `functions::places`.
    pub async fn find_nearby_places(
        &self,
        origin: &Location,
        radius: u32,
    ) -> Result<Vec<OverpassElement>, SearchError> {
        let query = build_overpass_query(origin, radius);
        debug!("Querying Overpass around ({}, {})", origin.lat, origin.lng);

        let response = self
            .client
            .post(&self.base_url)
            .form(&[("data", query.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            error!(
                "Overpass API error: status={} statusText={:?}",
                status.as_u16(),
                status.canonical_reason()
            );
            return Err(SearchError::BadStatus {
                status: status.as_u16(),
            });
        }

        let body: OverpassResponse = response.json().await?;
        debug!("Overpass returned {} elements", body.elements.len());
        Ok(body.elements)
    }
}

fn build_overpass_query(origin: &Location, radius: u32) -> String {
    let mut clauses = String::new();
    for tag in ["amenity", "shop", "leisure"] {
        for element in ["node", "way", "relation"] {
            clauses.push_str(&format!(
                "{element}[\"{tag}\"](around:{radius},{lat},{lng});",
                lat = origin.lat,
                lng = origin.lng,
            ));
        }
    }
    format!("[out:json][timeout:25];({clauses});out body;>;out skel qt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_covers_all_categories_and_element_kinds() {
        let q = build_overpass_query(&Location::new(51.505, -0.09), SEARCH_RADIUS_M);
        assert!(q.starts_with("[out:json][timeout:25];"));
        for tag in ["amenity", "shop", "leisure"] {
            assert!(q.contains(&format!("node[\"{tag}\"](around:10000,51.505,-0.09);")));
            assert!(q.contains(&format!("way[\"{tag}\"]")));
            assert!(q.contains(&format!("relation[\"{tag}\"]")));
        }
    }

    #[test]
    fn element_coordinates_prefer_direct_then_center() {
        let node: OverpassElement =
            serde_json::from_str(r#"{"lat": 1.0, "lon": 2.0, "tags": {}}"#).unwrap();
        assert_eq!(node.coordinates(), Some((1.0, 2.0)));

        let way: OverpassElement =
            serde_json::from_str(r#"{"center": {"lat": 3.0, "lon": 4.0}}"#).unwrap();
        assert_eq!(way.coordinates(), Some((3.0, 4.0)));

        let bare: OverpassElement = serde_json::from_str(r#"{"tags": {"amenity": "pub"}}"#).unwrap();
        assert_eq!(bare.coordinates(), None);
    }
}
