//! Traveler - tailor-made travel itineraries
//!
//! This library provides the core of the itinerary generator: prompting an
//! LLM, recovering a typed itinerary from its near-JSON answer, and
//! debounced destination autocomplete against a geocoding API.

pub mod api;
pub mod config;
pub mod debouncer;
pub mod error;
pub mod geocoding;
pub mod itinerary;
pub mod llm;
pub mod logging;
pub mod models;
pub mod sanitizer;
pub mod validator;
pub mod web;

// Re-export core types for public API
pub use api::AppState;
pub use config::TravelerConfig;
pub use debouncer::SuggestionDebouncer;
pub use error::TravelerError;
pub use geocoding::{GeocodeProvider, MapboxGeocoder};
pub use itinerary::ItineraryService;
pub use llm::LlmClient;
pub use models::{GeocodeSuggestion, Itinerary, ItineraryRequest, Language, SuggestionSet};
pub use sanitizer::{BoundaryRule, Sanitizer, sanitize_and_extract};
pub use validator::validate;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TravelerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
