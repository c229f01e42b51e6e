//! Geocoding client for destination autocomplete
//!
//! Queries the Mapbox places search endpoint and maps each returned feature
//! to a [`GeocodeSuggestion`]. Failures surface as
//! [`TravelerError::GeocodeLookup`]; callers degrade them to an empty list.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Instant;
use tracing::{debug, instrument, warn};

use crate::config::GeocodingConfig;
use crate::models::{Coordinates, GeocodeSuggestion};
use crate::{Result, TravelerError};

/// Place search backend
#[async_trait]
pub trait GeocodeProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<GeocodeSuggestion>>;
}

/// Mapbox v5 places search
pub struct MapboxGeocoder {
    client: Client,
    base_url: String,
    access_token: String,
    limit: u8,
    autocomplete: bool,
}

#[derive(Debug, Deserialize)]
struct PlacesResponse {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    id: String,
    place_name: String,
    /// `[longitude, latitude]`
    center: [f64; 2],
}

impl From<Feature> for GeocodeSuggestion {
    fn from(feature: Feature) -> Self {
        let [longitude, latitude] = feature.center;
        GeocodeSuggestion {
            id: feature.id,
            display_name: feature.place_name,
            coordinates: Coordinates::new(longitude, latitude),
        }
    }
}

impl MapboxGeocoder {
    /// Create a new geocoder from configuration
    pub fn from_config(config: &GeocodingConfig) -> anyhow::Result<Self> {
        let access_token = config.resolve_access_token()?;
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("Traveler/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TravelerError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_token,
            limit: config.limit,
            autocomplete: config.autocomplete,
        })
    }

    /// Search URL for `query`
    #[must_use]
    pub fn search_url(&self, query: &str) -> String {
        format!(
            "{}/{}.json?access_token={}&autocomplete={}&limit={}",
            self.base_url,
            urlencoding::encode(query),
            urlencoding::encode(&self.access_token),
            self.autocomplete,
            self.limit
        )
    }
}

#[async_trait]
impl GeocodeProvider for MapboxGeocoder {
    #[instrument(name = "geocode", skip(self))]
    async fn search(&self, query: &str) -> Result<Vec<GeocodeSuggestion>> {
        let start_time = Instant::now();

        let response = self
            .client
            .get(self.search_url(query))
            .send()
            .await
            .map_err(|e| TravelerError::geocode(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "Geocoding API returned an error status");
            return Err(TravelerError::geocode(format!(
                "Geocoding API responded with {status}"
            )));
        }

        let places: PlacesResponse = response
            .json()
            .await
            .map_err(|e| TravelerError::geocode(format!("Invalid geocoding payload: {e}")))?;

        let suggestions: Vec<GeocodeSuggestion> = places
            .features
            .into_iter()
            .take(self.limit.into())
            .map(GeocodeSuggestion::from)
            .collect();

        debug!(
            count = suggestions.len(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Geocoding lookup finished"
        );
        Ok(suggestions)
    }
}
