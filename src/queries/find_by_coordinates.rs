use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use serde::Deserialize;
use tracing::warn;

use crate::queries::_structs::{Location, MobilityAmenity, RealTimeInfo};

/// Reverse-geocode payload. Nominatim serializes coordinates as strings.
#[derive(Debug, Deserialize)]
struct ReverseGeocodeResponse {
    display_name: String,
    lat: String,
    lon: String,
    #[serde(default)]
    tags: HashMap<String, String>,
}

/// Client for the reverse-geocoding service.
pub struct ReverseGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl ReverseGeocoder {
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(15))
                .build()
                .unwrap_or_default(),
            base_url,
        }
    }

    /// Describe the current position as a single amenity record. Lookup
    /// failures degrade to an empty list rather than failing the request.
    pub async fn find_by_coordinates(&self, location: &Location) -> Vec<MobilityAmenity> {
        let url = format!(
            "{}/reverse?format=json&lat={}&lon={}",
            self.base_url, location.lat, location.lng
        );

        let data: ReverseGeocodeResponse = match self.fetch(&url).await {
            Ok(data) => data,
            Err(e) => {
                warn!("Error fetching location details: {}", e);
                return Vec::new();
            }
        };

        let lat = data.lat.parse().unwrap_or(location.lat);
        let lng = data.lon.parse().unwrap_or(location.lng);

        vec![MobilityAmenity {
            kind: "location".into(),
            name: data.display_name,
            location: Location::new(lat, lng),
            accessibility: accessibility_features(&data.tags),
            real_time_info: Some(RealTimeInfo {
                status: "active".into(),
                next_update: Some((Utc::now() + chrono::Duration::minutes(5)).to_rfc3339()),
            }),
        }]
    }

    async fn fetch(&self, url: &str) -> Result<ReverseGeocodeResponse, reqwest::Error> {
        self.client.get(url).send().await?.json().await
    }
}

fn accessibility_features(tags: &HashMap<String, String>) -> Vec<String> {
    let mut features = Vec::new();
    if tags.get("wheelchair").map(String::as_str) == Some("yes") {
        features.push("wheelchair".to_string());
    }
    if tags.get("tactile_paving").map(String::as_str) == Some("yes") {
        features.push("tactile".to_string());
    }
    if tags.get("audio_signals").map(String::as_str) == Some("yes") {
        features.push("audio".to_string());
    }
    features
}
