use rand::Rng;
use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::functions::compose::{
    build_prompt, clean_generated, destination_preamble, extract_route_payload, fold_payload,
};
use crate::functions::intent::{extract_intent, Intent};
use crate::functions::mobility::mobility_snapshot;
use crate::functions::places::{normalize_places, select_place};
use crate::functions::routes::{envelope, no_places_response, routed, straight_line};
use crate::queries::_structs::{Location, MobilityResponse};
use crate::queries::find_by_coordinates::ReverseGeocoder;
use crate::queries::find_nearby::{PlaceSearch, SearchError, SEARCH_RADIUS_M};
use crate::queries::find_route::{RoutingError, RoutingService};
use crate::queries::generate_text::{GenerationError, TextGenerator};

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("API configuration error - Token not found")]
    MissingToken,
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

#[derive(Debug, thiserror::Error)]
enum ResolveError {
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error(transparent)]
    Routing(#[from] RoutingError),
    #[error("No suitable place found")]
    NoSuitablePlace,
}

enum Resolution {
    /// Mobility data computed, continue to the language model.
    Resolved(MobilityResponse),
    /// Nothing found in the area; the reply is already complete and the
    /// model call is skipped.
    NoPlaces {
        message: String,
        data: MobilityResponse,
    },
}

/// The assembled answer for one chat turn.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatOutcome {
    pub response: String,
    pub mobility_data: Option<MobilityResponse>,
}

/// Stateless per-process orchestrator: intent extraction, place resolution,
/// route building and response composition. Holds no per-request fields, so
/// a single instance is shared across concurrent requests.
pub struct ChatService {
    config: AppConfig,
    places: PlaceSearch,
    routing: RoutingService,
    geocoder: ReverseGeocoder,
    generator: TextGenerator,
}

impl ChatService {
    pub fn new(config: AppConfig) -> Self {
        Self {
            places: PlaceSearch::new(config.overpass_url.clone()),
            routing: RoutingService::new(config.osrm_url.clone()),
            geocoder: ReverseGeocoder::new(config.nominatim_url.clone()),
            generator: TextGenerator::new(config.hf_api_url.clone()),
            config,
        }
    }

    /// Process one chat turn end-to-end. Upstream geodata failures degrade
    /// to a model-only answer; model failures surface to the caller.
    pub async fn handle(
        &self,
        message: &str,
        location: Option<Location>,
    ) -> Result<ChatOutcome, ChatError> {
        let token = self
            .config
            .hf_token
            .as_deref()
            .ok_or(ChatError::MissingToken)?;

        let mut mobility: Option<MobilityResponse> = None;

        if let Some(ref start) = location {
            let intent = extract_intent(message);
            info!(
                "Intent: route={} nearest={} mode={:?} destination={:?}",
                intent.is_route_request,
                intent.is_nearest_query,
                intent.transport_mode,
                intent.destination_type
            );

            if intent.is_route_request {
                match self.resolve_route(start, &intent).await {
                    Ok(Resolution::Resolved(data)) => mobility = Some(data),
                    Ok(Resolution::NoPlaces { message, data }) => {
                        return Ok(ChatOutcome {
                            response: message,
                            mobility_data: Some(data),
                        });
                    }
                    Err(e) => {
                        // Mobility data is unavailable for this turn; the
                        // model still gets to answer.
                        error!("Error fetching places: {}", e);
                    }
                }
            } else {
                match mobility_snapshot(&self.routing, &self.geocoder, start, start).await {
                    Ok(data) => mobility = Some(data),
                    Err(e) => warn!("Mobility snapshot unavailable: {}", e),
                }
            }
        }

        let prompt = build_prompt(message, location.as_ref(), mobility.as_ref());
        let generated = self
            .generator
            .generate(token, &self.config.model_id, &prompt)
            .await?;

        let cleaned = clean_generated(&prompt, &generated);
        let (visible, payload) = extract_route_payload(&cleaned);
        let preamble = destination_preamble(mobility.as_ref());

        let mobility_data = match payload {
            Some(payload) => Some(fold_payload(payload, mobility)),
            None => mobility,
        };

        Ok(ChatOutcome {
            response: format!("{preamble}{visible}"),
            mobility_data,
        })
    }

    /// Resolve a route request: one radius-bounded place search, candidate
    /// ranking, then routing — degrading to a straight line when the router
    /// reports failure, or to a synthesized nearby point when the area has
    /// no places at all.
    async fn resolve_route(
        &self,
        start: &Location,
        intent: &Intent,
    ) -> Result<Resolution, ResolveError> {
        let elements = self
            .places
            .find_nearby_places(start, SEARCH_RADIUS_M)
            .await?;

        if elements.is_empty() {
            info!("No places found in the area");
            let bearing = rand::thread_rng().gen_range(0.0..std::f64::consts::TAU);
            let (message, data) = no_places_response(
                start,
                intent.transport_mode,
                &intent.destination_type,
                bearing,
            );
            return Ok(Resolution::NoPlaces { message, data });
        }

        let candidates = normalize_places(start, &elements);
        let selected = select_place(candidates, &intent.destination_type, intent.is_nearest_query)
            .ok_or(ResolveError::NoSuitablePlace)?;
        info!(
            "Selected place: {} ({}) at {:.2} km",
            selected.name, selected.kind, selected.distance
        );

        let end = Location::named(
            selected.coordinates.lat,
            selected.coordinates.lng,
            selected.name.clone(),
        );

        let body = self
            .routing
            .find_route(start, &end, intent.transport_mode)
            .await?;

        if body.code == "Ok" {
            if let Some(osrm) = body.routes.first() {
                return Ok(Resolution::Resolved(envelope(routed(
                    osrm,
                    intent.transport_mode,
                    &selected,
                ))));
            }
        }

        error!("Route calculation failed: code={}", body.code);
        Ok(Resolution::Resolved(envelope(straight_line(
            start,
            &end,
            intent.transport_mode,
        ))))
    }
}
