//! Destination suggestion models for geocoded autocomplete

use serde::{Deserialize, Serialize};

/// Point on the map
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinates {
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Latitude in decimal degrees
    pub latitude: f64,
}

impl Coordinates {
    #[must_use]
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Format as "lat, lon" with four decimals
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// One candidate place for a typed query
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeSuggestion {
    pub id: String,
    pub display_name: String,
    pub coordinates: Coordinates,
}

/// Suggestions delivered for one query. Replaced wholesale by the next query.
#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct SuggestionSet {
    pub query: String,
    pub suggestions: Vec<GeocodeSuggestion>,
}

impl SuggestionSet {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.suggestions.is_empty()
    }
}
