//! Itinerary schema validation
//!
//! The parsed model output is only trusted once every section is present and
//! is an array of strings. Nothing is coerced: a number where a string is
//! expected, or a string where an array is expected, rejects the field.

use serde_json::{Map, Value};
use tracing::debug;

use crate::models::Itinerary;
use crate::{Result, TravelerError};

/// Check `value` against the itinerary shape and build the typed result
pub fn validate(value: Value) -> Result<Itinerary> {
    let Value::Object(mut object) = value else {
        debug!("Model response is not a JSON object");
        return Err(TravelerError::schema_mismatch(Itinerary::FIELDS));
    };

    let invalid: Vec<&str> = Itinerary::FIELDS
        .into_iter()
        .filter(|field| !is_string_array(object.get(*field)))
        .collect();
    if !invalid.is_empty() {
        debug!(fields = ?invalid, "Model response failed schema validation");
        return Err(TravelerError::schema_mismatch(invalid));
    }

    Ok(Itinerary {
        daily_itinerary: take_strings(&mut object, "dailyItinerary"),
        gastronomy: take_strings(&mut object, "gastronomy"),
        entertainment: take_strings(&mut object, "entertainment"),
        hotel_recommendations: take_strings(&mut object, "hotelRecommendations"),
        curiosities: take_strings(&mut object, "curiosities"),
    })
}

fn is_string_array(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Array(items)) => items.iter().all(Value::is_string),
        _ => false,
    }
}

// Only called after `is_string_array` accepted the field.
fn take_strings(object: &mut Map<String, Value>, field: &str) -> Vec<String> {
    match object.remove(field) {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn complete() -> Value {
        json!({
            "dailyItinerary": ["Day 1: Montmartre", "Day 2: Versailles"],
            "gastronomy": ["Croissant at Du Pain et des Idées"],
            "entertainment": ["Moulin Rouge"],
            "hotelRecommendations": ["Le Marais boutique hotel"],
            "curiosities": ["Paris was once called Lutetia"]
        })
    }

    #[test]
    fn test_complete_object_validates() {
        let itinerary = validate(complete()).unwrap();
        assert_eq!(
            itinerary.daily_itinerary,
            vec!["Day 1: Montmartre", "Day 2: Versailles"]
        );
        assert_eq!(itinerary.hotel_recommendations, vec!["Le Marais boutique hotel"]);
        assert_eq!(itinerary.curiosities.len(), 1);
    }

    #[test]
    fn test_empty_sections_are_valid() {
        let mut value = complete();
        value["entertainment"] = json!([]);
        assert!(validate(value).unwrap().entertainment.is_empty());
    }

    #[test]
    fn test_extra_keys_ignored() {
        let mut value = complete();
        value["budget"] = json!("moderate");
        assert!(validate(value).is_ok());
    }

    #[rstest]
    #[case("dailyItinerary")]
    #[case("gastronomy")]
    #[case("entertainment")]
    #[case("hotelRecommendations")]
    #[case("curiosities")]
    fn test_missing_field_is_named(#[case] field: &str) {
        let mut value = complete();
        value.as_object_mut().unwrap().remove(field);

        match validate(value).unwrap_err() {
            TravelerError::SchemaMismatch { fields } => assert_eq!(fields, vec![field]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[rstest]
    #[case(json!("Day 1: Louvre"))]
    #[case(json!([1, 2]))]
    #[case(json!(["ok", null]))]
    #[case(json!({"day1": "Louvre"}))]
    fn test_wrong_type_is_not_coerced(#[case] bad: Value) {
        let mut value = complete();
        value["gastronomy"] = bad;

        match validate(value).unwrap_err() {
            TravelerError::SchemaMismatch { fields } => assert_eq!(fields, vec!["gastronomy"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_all_invalid_fields_reported_in_order() {
        let value = json!({"gastronomy": ["ok"], "curiosities": "nope"});
        match validate(value).unwrap_err() {
            TravelerError::SchemaMismatch { fields } => assert_eq!(
                fields,
                vec!["dailyItinerary", "entertainment", "hotelRecommendations", "curiosities"]
            ),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_object_reports_every_field() {
        match validate(json!(["not", "an", "object"])).unwrap_err() {
            TravelerError::SchemaMismatch { fields } => assert_eq!(fields.len(), 5),
            other => panic!("unexpected error: {other}"),
        }
    }
}
