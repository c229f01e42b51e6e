//! Itinerary request orchestration
//!
//! One prompt, one completion call, then sanitize and validate. Errors from
//! any stage are returned as they are; there is no retry and no caching.
//! Dropping the future returned by [`ItineraryService::request_itinerary`]
//! drops the in-flight provider request with it.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::llm::{CompletionRequest, LlmClient, Message};
use crate::models::{Itinerary, ItineraryRequest};
use crate::sanitizer::Sanitizer;
use crate::{Result, TravelerError, validator};

const RESPONSE_SHAPE: &str = r#"{
  "dailyItinerary": [
    "Day 1: Highlights of the day (e.g., 'Visit major attractions, enjoy cultural experiences, and taste local food.')"
  ],
  "gastronomy": [
    "Restaurant: Description of local dishes (e.g., 'Aruba: Enjoy traditional Brazilian cuisine.')"
  ],
  "entertainment": [
    "Activity: Description (e.g., 'Teatro Municipal: Enjoy a Broadway-style show.')"
  ],
  "hotelRecommendations": [
    "Hotel: Description (e.g., 'Hotel Delphinus: A luxurious stay with great amenities.')"
  ],
  "curiosities": [
    "Fact: Interesting detail (e.g., 'The city is known as the \"Capital of Chocolate\" due to its many chocolate shops.')"
  ]
}"#;

/// Build the itinerary prompt for `request`
#[must_use]
pub fn build_prompt(request: &ItineraryRequest) -> String {
    format!(
        "Create a travel itinerary for the destination: {destination} for {days} days in {language}.\n\
         \n\
         Respond with a single valid JSON object with exactly this structure:\n\
         \n\
         {shape}\n\
         \n\
         Important:\n\
         - The keys in the JSON object must be in English, whatever language the content is written in.\n\
         - All five sections (dailyItinerary, gastronomy, entertainment, hotelRecommendations, curiosities) must be present, each as an array of strings.\n\
         - Write the content of every string in {language}.\n\
         - Return only the JSON object, without any text before or after it.\n",
        destination = request.destination(),
        days = request.days(),
        language = request.language().prompt_name(),
        shape = RESPONSE_SHAPE,
    )
}

/// Generates itineraries through an LLM
pub struct ItineraryService {
    llm: Arc<dyn LlmClient>,
    sanitizer: Sanitizer,
}

impl ItineraryService {
    #[must_use]
    pub fn new(llm: Arc<dyn LlmClient>, sanitizer: Sanitizer) -> Self {
        Self { llm, sanitizer }
    }

    /// Request, sanitize and validate one itinerary
    #[instrument(
        skip(self, request),
        fields(
            destination = %request.destination(),
            days = request.days(),
            language = %request.language()
        )
    )]
    pub async fn request_itinerary(&self, request: &ItineraryRequest) -> Result<Itinerary> {
        let completion = CompletionRequest {
            messages: vec![Message::user(build_prompt(request))],
        };

        let response = self.llm.complete(completion).await?;
        let content = response
            .content
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| TravelerError::provider("No content returned from the AI model"))?;

        let itinerary = self
            .sanitizer
            .sanitize_and_extract(&content)
            .and_then(validator::validate)
            .inspect_err(|e| {
                warn!(error = %e, "Model response rejected");
                if e.is_malformed_response() {
                    debug!(response = %content, "Raw model response");
                }
            })?;

        info!(
            days_planned = itinerary.daily_itinerary.len(),
            "Itinerary generated"
        );
        Ok(itinerary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::mock::MockLlmClient;
    use crate::llm::Role;
    use crate::models::Language;
    use crate::sanitizer::BoundaryRule;

    const PARIS: &str = r#"{"dailyItinerary": ["Day 1: Louvre", "Day 2: Orsay", "Day 3: Versailles"], "gastronomy": ["Croissants"], "entertainment": ["Opera Garnier"], "hotelRecommendations": ["Hotel Lutetia"], "curiosities": ["The Eiffel Tower grows in summer"]}"#;

    fn paris() -> ItineraryRequest {
        ItineraryRequest::new("Paris", 3, Language::English).unwrap()
    }

    fn service(llm: &Arc<MockLlmClient>) -> ItineraryService {
        ItineraryService::new(llm.clone(), Sanitizer::default())
    }

    #[test]
    fn test_prompt_embeds_request() {
        let request = ItineraryRequest::new("Florianópolis", 5, Language::BrazilianPortuguese).unwrap();
        let prompt = build_prompt(&request);
        assert!(prompt.contains("destination: Florianópolis for 5 days in Brazilian Portuguese"));
        assert!(prompt.contains("must be in English"));
        for field in Itinerary::FIELDS {
            assert!(prompt.contains(field), "prompt is missing {field}");
        }
    }

    #[tokio::test]
    async fn test_paris_end_to_end() {
        let llm = Arc::new(MockLlmClient::answering(PARIS));
        let itinerary = service(&llm).request_itinerary(&paris()).await.unwrap();

        assert_eq!(
            itinerary.daily_itinerary,
            vec!["Day 1: Louvre", "Day 2: Orsay", "Day 3: Versailles"]
        );
        assert_eq!(itinerary.gastronomy, vec!["Croissants"]);
        assert_eq!(itinerary.entertainment, vec!["Opera Garnier"]);
        assert_eq!(itinerary.hotel_recommendations, vec!["Hotel Lutetia"]);
        assert_eq!(itinerary.curiosities, vec!["The Eiffel Tower grows in summer"]);
        assert_eq!(llm.call_count(), 1);

        let request = llm.last_request().unwrap();
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, Role::User);
        assert!(request.messages[0].content.contains("Paris"));
    }

    #[tokio::test]
    async fn test_prose_wrapped_answer_with_stray_quotes() {
        let answer = r#"Here is your plan!
{"dailyItinerary": ["Day 1: Walk"], "gastronomy": ["Try the "best" crêpes"], "entertainment": [], "hotelRecommendations": ["Hotel"], "curiosities": ["Known as the "City of Light""]}
Have fun."#;
        let llm = Arc::new(MockLlmClient::answering(answer));
        let itinerary = service(&llm).request_itinerary(&paris()).await.unwrap();
        assert_eq!(itinerary.gastronomy, vec!["Try the \"best\" crêpes"]);
        assert_eq!(itinerary.curiosities, vec!["Known as the \"City of Light\""]);
    }

    #[tokio::test]
    async fn test_plain_prose_fails_with_boundary_error() {
        let llm = Arc::new(MockLlmClient::answering("Sorry, I cannot plan that trip."));
        let err = service(&llm).request_itinerary(&paris()).await.unwrap_err();
        assert!(matches!(err, TravelerError::NoObjectBoundary { .. }));
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_section_fails_closed() {
        let llm = Arc::new(MockLlmClient::answering(
            r#"{"dailyItinerary": ["Day 1"], "gastronomy": [], "entertainment": [], "hotelRecommendations": []}"#,
        ));
        let err = service(&llm).request_itinerary(&paris()).await.unwrap_err();
        match err {
            TravelerError::SchemaMismatch { fields } => assert_eq!(fields, vec!["curiosities"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_provider_failure_is_not_retried() {
        let llm = Arc::new(MockLlmClient::failing("429 Too Many Requests"));
        let err = service(&llm).request_itinerary(&paris()).await.unwrap_err();
        assert!(matches!(err, TravelerError::Provider { .. }));
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_content_is_provider_error() {
        let llm = Arc::new(MockLlmClient::empty());
        let err = service(&llm).request_itinerary(&paris()).await.unwrap_err();
        assert!(matches!(err, TravelerError::Provider { .. }));
    }

    #[tokio::test]
    async fn test_balanced_boundary_ignores_trailing_example() {
        let answer = format!("{PARIS}\n\nFor reference, an example: {{\"dailyItinerary\": []}}");
        let llm = Arc::new(MockLlmClient::answering(answer));

        let outermost = service(&llm).request_itinerary(&paris()).await;
        assert!(outermost.is_err());

        let balanced = ItineraryService::new(llm.clone(), Sanitizer::new(BoundaryRule::Balanced));
        assert!(balanced.request_itinerary(&paris()).await.is_ok());
        assert_eq!(llm.call_count(), 2);
    }
}
