use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{error, warn};

use crate::{
    TravelerError, VERSION,
    geocoding::GeocodeProvider,
    itinerary::ItineraryService,
    models::{GeocodeSuggestion, Itinerary, ItineraryRequest, Language},
};

/// Only message the UI ever sees for a failed generation
pub const ITINERARY_FAILURE: &str = "Failed to generate itinerary";

#[derive(Clone)]
pub struct AppState {
    pub itineraries: Arc<ItineraryService>,
    pub geocoder: Arc<dyn GeocodeProvider>,
}

#[derive(Debug, Deserialize)]
pub struct ItineraryPayload {
    pub destination: String,
    pub days: u32,
    pub language: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SuggestionQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug)]
pub enum ApiError {
    InvalidInput(String),
    Pipeline(TravelerError),
}

impl From<TravelerError> for ApiError {
    fn from(err: TravelerError) -> Self {
        match err {
            TravelerError::Validation { message } => ApiError::InvalidInput(message),
            other => ApiError::Pipeline(other),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidInput(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::InvalidInput(message) => {
                (StatusCode::BAD_REQUEST, Json(ErrorBody { error: message })).into_response()
            }
            ApiError::Pipeline(err) => {
                error!(error = %err, "Itinerary generation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody {
                        error: ITINERARY_FAILURE.to_string(),
                    }),
                )
                    .into_response()
            }
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/itinerary", post(create_itinerary))
        // legacy path still called by existing web clients
        .route("/openai", post(create_itinerary))
        .route("/suggestions", get(get_suggestions))
        .route("/health", get(health))
        .with_state(state)
}

async fn create_itinerary(
    State(state): State<AppState>,
    payload: Result<Json<ItineraryPayload>, JsonRejection>,
) -> Result<Json<Itinerary>, ApiError> {
    let Json(payload) = payload?;
    let language = match payload.language.as_deref() {
        Some(language) => language.parse()?,
        None => Language::English,
    };
    let request = ItineraryRequest::new(payload.destination, payload.days, language)?;
    let itinerary = state.itineraries.request_itinerary(&request).await?;
    Ok(Json(itinerary))
}

async fn get_suggestions(
    State(state): State<AppState>,
    Query(params): Query<SuggestionQuery>,
) -> Json<Vec<GeocodeSuggestion>> {
    let query = params.q.trim();
    if query.is_empty() {
        return Json(Vec::new());
    }

    match state.geocoder.search(query).await {
        Ok(suggestions) => Json(suggestions),
        Err(e) => {
            warn!(error = %e, %query, "Suggestion lookup failed, returning none");
            Json(Vec::new())
        }
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": VERSION }))
}
