//! Data models for the Traveler application
//!
//! This module contains the core domain models organized by concern:
//! - Itinerary: the request a user submits and the validated plan returned
//! - Suggestion: geocoded destination candidates for autocomplete

pub mod itinerary;
pub mod suggestion;

// Re-export all public types for convenient access
pub use itinerary::{Itinerary, ItineraryRequest, Language};
pub use suggestion::{Coordinates, GeocodeSuggestion, SuggestionSet};
