//! Error types and handling for the Traveler itinerary pipeline

use thiserror::Error;

/// Main error type for the Traveler application
#[derive(Error, Debug)]
pub enum TravelerError {
    /// The model response has no `{ ... }` span to extract
    #[error("No JSON object found in model response: {message}")]
    NoObjectBoundary { message: String },

    /// The extracted span is still not valid JSON after repair
    #[error("Failed to parse JSON from model response: {source}")]
    UnparseableJson {
        #[source]
        source: serde_json::Error,
    },

    /// The parsed object does not have the itinerary shape
    #[error("Itinerary schema mismatch, missing or invalid fields: {}", fields.join(", "))]
    SchemaMismatch { fields: Vec<String> },

    /// LLM provider communication errors
    #[error("LLM provider error: {message}")]
    Provider { message: String },

    /// Geocoding lookup errors (never fatal, callers degrade to no suggestions)
    #[error("Geocoding lookup failed: {message}")]
    GeocodeLookup { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl TravelerError {
    /// Create a new missing-boundary error
    pub fn no_object_boundary<S: Into<String>>(message: S) -> Self {
        Self::NoObjectBoundary {
            message: message.into(),
        }
    }

    /// Create a new schema mismatch error for the given field names
    pub fn schema_mismatch<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::SchemaMismatch {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a new provider error
    pub fn provider<S: Into<String>>(message: S) -> Self {
        Self::Provider {
            message: message.into(),
        }
    }

    /// Create a new geocoding error
    pub fn geocode<S: Into<String>>(message: S) -> Self {
        Self::GeocodeLookup {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether the model answered but its text could not be turned into JSON
    #[must_use]
    pub fn is_malformed_response(&self) -> bool {
        matches!(
            self,
            TravelerError::NoObjectBoundary { .. } | TravelerError::UnparseableJson { .. }
        )
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            TravelerError::NoObjectBoundary { .. }
            | TravelerError::UnparseableJson { .. }
            | TravelerError::SchemaMismatch { .. } => {
                "The travel assistant returned an unexpected answer. Please try again.".to_string()
            }
            TravelerError::Provider { .. } => {
                "Unable to reach the travel assistant. Please try again later.".to_string()
            }
            TravelerError::GeocodeLookup { .. } => {
                "Destination suggestions are currently unavailable.".to_string()
            }
            TravelerError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            TravelerError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
        }
    }
}

impl From<serde_json::Error> for TravelerError {
    fn from(source: serde_json::Error) -> Self {
        TravelerError::UnparseableJson { source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let boundary = TravelerError::no_object_boundary("no opening brace");
        assert!(matches!(boundary, TravelerError::NoObjectBoundary { .. }));

        let provider = TravelerError::provider("connection refused");
        assert!(matches!(provider, TravelerError::Provider { .. }));

        let validation = TravelerError::validation("days must be positive");
        assert!(matches!(validation, TravelerError::Validation { .. }));
    }

    #[test]
    fn test_schema_mismatch_lists_fields() {
        let err = TravelerError::schema_mismatch(["gastronomy", "curiosities"]);
        assert_eq!(
            err.to_string(),
            "Itinerary schema mismatch, missing or invalid fields: gastronomy, curiosities"
        );
    }

    #[test]
    fn test_malformed_response_grouping() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(TravelerError::from(parse_err).is_malformed_response());
        assert!(TravelerError::no_object_boundary("x").is_malformed_response());
        assert!(!TravelerError::schema_mismatch(["gastronomy"]).is_malformed_response());
        assert!(!TravelerError::provider("x").is_malformed_response());
    }

    #[test]
    fn test_user_messages() {
        let provider = TravelerError::provider("503");
        assert!(provider.user_message().contains("Unable to reach"));

        let validation = TravelerError::validation("destination is empty");
        assert!(validation.user_message().contains("destination is empty"));

        let schema = TravelerError::schema_mismatch(["hotelRecommendations"]);
        assert!(!schema.user_message().contains("hotelRecommendations"));
    }
}
