use serde::Deserialize;
use tracing::{debug, warn};

use crate::functions::routes::green_score;
use crate::queries::_structs::{
    Accessibility, Location, MobilityResponse, Mode, RealTimeUpdates, Route, RouteStep,
    Sustainability, TransportMode,
};

/// Textual marker the model uses to embed a structured route payload.
const ROUTE_DATA_MARKER: &str = "ROUTE_DATA: ";

/// Build the instruction block sent to the model: current location, a
/// digest of the computed mobility data when present, the verbatim user
/// question and the fixed response-style guidelines.
pub fn build_prompt(
    message: &str,
    location: Option<&Location>,
    mobility: Option<&MobilityResponse>,
) -> String {
    let location_label = match location {
        Some(loc) => format!(
            "{} ({}, {})",
            loc.name.as_deref().unwrap_or("London, UK"),
            loc.lat,
            loc.lng
        ),
        None => "London, UK (51.505, -0.09)".to_string(),
    };

    let mobility_digest = match mobility {
        Some(data) => {
            let modes = data
                .routes
                .iter()
                .map(|r| r.mode.name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "Current mobility data:\n\
                 - Available transport modes: {}\n\
                 - Real-time updates: {} traffic, {} weather\n",
                modes, data.real_time_updates.traffic, data.real_time_updates.weather
            )
        }
        None => String::new(),
    };

    let destination_name = mobility
        .and_then(|data| data.routes.first())
        .and_then(|route| route.destination.as_ref())
        .map(|dest| dest.name.as_str())
        .unwrap_or("Not available");

    format!(
        "<s>[INST] You are a mobility assistant. Provide concise, relevant information based on the user's question. Always respond in English only.\n\
         \n\
         Current location: {location_label}\n\
         \n\
         {mobility_digest}\n\
         User question: {message}\n\
         \n\
         Guidelines:\n\
         1. Always respond in English only\n\
         2. Be concise and direct\n\
         3. Only include information that was explicitly asked for\n\
         4. For route requests:\n\
            - Provide the route details\n\
            - Include distance and duration\n\
            - Only mention transport mode if specified in the question\n\
         5. For accessibility queries:\n\
            - Only respond if specifically asked about accessibility\n\
            - Do not assume any specific accessibility needs\n\
         6. For sustainability:\n\
            - Only provide sustainability information if specifically asked\n\
         7. For transport mode selection:\n\
            - Only suggest transport modes if asked\n\
            - Do not make assumptions about user preferences\n\
         8. When asked about the destination name, always include the name: {destination_name}\n\
         \n\
         [/INST]</s>"
    )
}

/// Strip the echoed prompt and the instruction control tokens from the
/// generated text.
pub fn clean_generated(prompt: &str, generated: &str) -> String {
    generated
        .replace(prompt, "")
        .replace("</s>", "")
        .replace("<s>", "")
        .replace("[/INST]", "")
        .trim()
        .to_string()
}

/// Structured route payload the model may embed after the marker. Parsed
/// leniently; anything unparseable is discarded as a whole.
#[derive(Debug, Clone, Deserialize)]
pub struct RoutePayload {
    pub mode: PayloadMode,
    #[serde(default)]
    pub distance: f64,
    #[serde(default)]
    pub duration: f64,
    #[serde(rename = "carbonFootprint", default)]
    pub carbon_footprint: f64,
    #[serde(default)]
    pub accessibility: Accessibility,
    #[serde(default)]
    pub steps: Vec<RouteStep>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PayloadMode {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "isSustainable", default)]
    pub is_sustainable: bool,
}

impl PayloadMode {
    fn descriptor(&self) -> TransportMode {
        let known = match self.name.to_lowercase().as_str() {
            "walking" => Some(Mode::Walking),
            "cycling" => Some(Mode::Cycling),
            "driving" => Some(Mode::Driving),
            _ => None,
        };
        match known {
            Some(mode) => {
                // The payload's own naming and sustainability flag win over
                // the catalog entry.
                let mut descriptor = mode.descriptor();
                descriptor.name = self.name.clone();
                descriptor.is_sustainable = self.is_sustainable;
                descriptor
            }
            None => TransportMode {
                id: self.name.to_lowercase(),
                name: self.name.clone(),
                icon: "🧭".into(),
                is_sustainable: self.is_sustainable,
                accessibility: "medium".into(),
            },
        }
    }
}

/// Look for the payload marker, parse the JSON object that follows it and
/// strip the marker text from the visible reply. A parse failure discards
/// the payload but still removes the marker.
pub fn extract_route_payload(text: &str) -> (String, Option<RoutePayload>) {
    let Some(marker_at) = text.find(ROUTE_DATA_MARKER) else {
        return (text.trim().to_string(), None);
    };

    let after_marker = &text[marker_at + ROUTE_DATA_MARKER.len()..];
    let (payload, consumed) = match balanced_json(after_marker) {
        Some(raw) => match serde_json::from_str::<RoutePayload>(raw) {
            Ok(parsed) => {
                debug!("Parsed route payload from generated text");
                (Some(parsed), raw.len())
            }
            Err(e) => {
                warn!("Error parsing route payload: {}", e);
                (None, raw.len())
            }
        },
        None => {
            // No balanced object; drop the rest of the marker line.
            let line_end = after_marker.find('\n').unwrap_or(after_marker.len());
            (None, line_end)
        }
    };

    let mut visible = String::with_capacity(text.len());
    visible.push_str(&text[..marker_at]);
    visible.push_str(&after_marker[consumed..]);
    (visible.trim().to_string(), payload)
}

/// Extract the first brace-balanced JSON object at the start of `s`,
/// respecting string literals and escapes.
fn balanced_json(s: &str) -> Option<&str> {
    let start = s.find('{')?;
    // Only whitespace may sit between the marker and the object.
    if !s[..start].trim().is_empty() {
        return None;
    }

    let mut depth = 0usize;
    let mut in_str = false;
    let mut escape = false;
    for (i, ch) in s[start..].char_indices() {
        if in_str {
            if escape {
                escape = false;
            } else if ch == '\\' {
                escape = true;
            } else if ch == '"' {
                in_str = false;
            }
            continue;
        }
        match ch {
            '"' => in_str = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&s[..start + i + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Fold the payload's route fields over the precomputed mobility data,
/// recomputing the sustainability score from the payload mode.
pub fn fold_payload(payload: RoutePayload, mobility: Option<MobilityResponse>) -> MobilityResponse {
    let precomputed_route = mobility
        .as_ref()
        .and_then(|data| data.routes.first().cloned());

    let route = Route {
        mode: payload.mode.descriptor(),
        distance: payload.distance,
        duration: payload.duration,
        carbon_footprint: payload.carbon_footprint,
        accessibility: payload.accessibility,
        steps: payload.steps,
        geometry: precomputed_route.as_ref().and_then(|r| r.geometry.clone()),
        destination: precomputed_route.and_then(|r| r.destination),
    };

    let sustainability = Sustainability {
        carbon_footprint: route.carbon_footprint,
        green_score: green_score(route.mode.is_sustainable),
    };
    let accessibility = route.accessibility;

    MobilityResponse {
        routes: vec![route],
        amenities: mobility
            .as_ref()
            .map(|data| data.amenities.clone())
            .unwrap_or_default(),
        sustainability,
        accessibility,
        real_time_updates: mobility
            .map(|data| data.real_time_updates)
            .unwrap_or_else(RealTimeUpdates::mock),
    }
}

/// Preamble naming the resolved destination, present only when one exists.
pub fn destination_preamble(mobility: Option<&MobilityResponse>) -> String {
    match mobility
        .and_then(|data| data.routes.first())
        .and_then(|route| route.destination.as_ref())
    {
        Some(dest) => format!(
            "Destination: {} ({})\nAddress: {}\n\n",
            dest.name, dest.kind, dest.address
        ),
        None => String::new(),
    }
}
