use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use crate::functions::chat::{ChatError, ChatService};
use crate::queries::_structs::{Location, MobilityResponse};

/// Fallback position when the client sends a location without coordinates.
const DEFAULT_LAT: f64 = 51.505;
const DEFAULT_LNG: f64 = -0.09;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    message: Option<String>,
    location: Option<LocationInput>,
}

#[derive(Debug, Deserialize)]
pub struct LocationInput {
    lat: Option<f64>,
    lng: Option<f64>,
    name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    response: String,
    #[serde(rename = "mobilityData")]
    mobility_data: Option<MobilityResponse>,
}

pub async fn chat(
    service: web::Data<ChatService>,
    body: web::Json<ChatRequest>,
) -> impl Responder {
    let message = match body
        .message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
    {
        Some(message) => message,
        None => {
            return HttpResponse::BadRequest().json(json!({ "error": "Message is required" }))
        }
    };

    let location = body.location.as_ref().map(|input| Location {
        lat: input.lat.unwrap_or(DEFAULT_LAT),
        lng: input.lng.unwrap_or(DEFAULT_LNG),
        name: input.name.clone(),
    });

    if let Some(ref loc) = location {
        if !loc.is_valid() {
            return HttpResponse::BadRequest()
                .json(json!({ "error": "Invalid location coordinates" }));
        }
    }

    match service.handle(message, location).await {
        Ok(outcome) => HttpResponse::Ok().json(ChatResponse {
            response: outcome.response,
            mobility_data: outcome.mobility_data,
        }),
        Err(ChatError::MissingToken) => {
            error!("Inference token is not configured; check the environment");
            HttpResponse::InternalServerError()
                .json(json!({ "error": ChatError::MissingToken.to_string() }))
        }
        Err(e) => {
            error!("Error processing chat request: {}", e);
            HttpResponse::InternalServerError().json(json!({ "error": e.to_string() }))
        }
    }
}
