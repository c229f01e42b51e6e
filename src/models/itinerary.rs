//! Itinerary request and result models

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::TravelerError;

/// Languages the itinerary content can be written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Language {
    BrazilianPortuguese,
    English,
    Italian,
    French,
    Spanish,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::BrazilianPortuguese,
        Language::English,
        Language::Italian,
        Language::French,
        Language::Spanish,
    ];

    /// Short code used by the web form
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Language::BrazilianPortuguese => "pt-BR",
            Language::English => "english",
            Language::Italian => "italian",
            Language::French => "french",
            Language::Spanish => "spanish",
        }
    }

    /// Name written into the prompt
    #[must_use]
    pub fn prompt_name(self) -> &'static str {
        match self {
            Language::BrazilianPortuguese => "Brazilian Portuguese",
            Language::English => "English",
            Language::Italian => "Italian",
            Language::French => "French",
            Language::Spanish => "Spanish",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prompt_name())
    }
}

impl FromStr for Language {
    type Err = TravelerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pt-br" | "pt" | "portuguese" | "brazilian portuguese" => {
                Ok(Language::BrazilianPortuguese)
            }
            "en" | "english" => Ok(Language::English),
            "it" | "italian" => Ok(Language::Italian),
            "fr" | "french" => Ok(Language::French),
            "es" | "spanish" => Ok(Language::Spanish),
            _ => Err(TravelerError::validation(format!(
                "Unsupported language '{}'. Must be one of: {}",
                s.trim(),
                Language::ALL
                    .iter()
                    .map(|l| l.code())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))),
        }
    }
}

impl TryFrom<String> for Language {
    type Error = TravelerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Language> for String {
    fn from(value: Language) -> Self {
        value.code().to_string()
    }
}

/// One user submission. Only constructible through [`ItineraryRequest::new`],
/// so every instance has a non-empty destination and at least one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItineraryRequest {
    destination: String,
    days: u32,
    language: Language,
}

impl ItineraryRequest {
    pub fn new<S: Into<String>>(
        destination: S,
        days: u32,
        language: Language,
    ) -> crate::Result<Self> {
        let destination = destination.into().trim().to_string();
        if destination.is_empty() {
            return Err(TravelerError::validation("destination must not be empty"));
        }
        if days == 0 {
            return Err(TravelerError::validation("days must be a positive number"));
        }
        Ok(Self {
            destination,
            days,
            language,
        })
    }

    #[must_use]
    pub fn destination(&self) -> &str {
        &self.destination
    }

    #[must_use]
    pub fn days(&self) -> u32 {
        self.days
    }

    #[must_use]
    pub fn language(&self) -> Language {
        self.language
    }
}

/// A validated travel plan. Every section is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Itinerary {
    pub daily_itinerary: Vec<String>,
    pub gastronomy: Vec<String>,
    pub entertainment: Vec<String>,
    pub hotel_recommendations: Vec<String>,
    pub curiosities: Vec<String>,
}

impl Itinerary {
    /// JSON keys of the five sections, in declaration order
    pub const FIELDS: [&'static str; 5] = [
        "dailyItinerary",
        "gastronomy",
        "entertainment",
        "hotelRecommendations",
        "curiosities",
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("pt-BR", Language::BrazilianPortuguese)]
    #[case("english", Language::English)]
    #[case("English", Language::English)]
    #[case(" Italian ", Language::Italian)]
    #[case("french", Language::French)]
    #[case("SPANISH", Language::Spanish)]
    fn test_language_parsing(#[case] input: &str, #[case] expected: Language) {
        assert_eq!(input.parse::<Language>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_language_rejected() {
        let err = "klingon".parse::<Language>().unwrap_err();
        assert!(matches!(err, TravelerError::Validation { .. }));
        assert!(err.to_string().contains("pt-BR"));
    }

    #[test]
    fn test_language_serde_uses_code() {
        let json = serde_json::to_string(&Language::BrazilianPortuguese).unwrap();
        assert_eq!(json, "\"pt-BR\"");
        let back: Language = serde_json::from_str("\"French\"").unwrap();
        assert_eq!(back, Language::French);
    }

    #[test]
    fn test_request_validation() {
        let request = ItineraryRequest::new("  Paris ", 3, Language::English).unwrap();
        assert_eq!(request.destination(), "Paris");
        assert_eq!(request.days(), 3);

        assert!(ItineraryRequest::new("   ", 3, Language::English).is_err());
        assert!(ItineraryRequest::new("Paris", 0, Language::English).is_err());
    }

    #[test]
    fn test_itinerary_serializes_camel_case() {
        let itinerary = Itinerary {
            daily_itinerary: vec!["Day 1: Louvre".into()],
            gastronomy: vec![],
            entertainment: vec![],
            hotel_recommendations: vec!["Hotel Lutetia".into()],
            curiosities: vec![],
        };
        let value = serde_json::to_value(&itinerary).unwrap();
        for field in Itinerary::FIELDS {
            assert!(value.get(field).is_some(), "missing {field}");
        }
        assert_eq!(value["hotelRecommendations"][0], "Hotel Lutetia");
    }
}
