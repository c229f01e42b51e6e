//! OpenAI-compatible chat completions client
//!
//! Works against any provider exposing `POST {base_url}/chat/completions`
//! with bearer authentication (Groq, OpenAI, local gateways).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, instrument, warn};

use super::{CompletionRequest, CompletionResponse, LlmClient, Message};
use crate::config::LlmConfig;
use crate::{Result, TravelerError};

/// Longest error body kept in a provider error message
const ERROR_BODY_LIMIT: usize = 300;

pub struct OpenAiCompatibleClient {
    model: String,
    api_key: String,
    endpoint: String,
    max_tokens: u32,
    http: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequestBody<'a> {
    model: &'a str,
    messages: &'a [Message],
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponseBody {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl OpenAiCompatibleClient {
    /// Create a new client from configuration
    pub fn from_config(config: &LlmConfig) -> anyhow::Result<Self> {
        let api_key = config.resolve_api_key()?;
        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("Traveler/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TravelerError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self::new(
            http,
            &config.base_url,
            config.model.clone(),
            api_key,
            config.max_tokens,
        ))
    }

    pub fn new(http: Client, base_url: &str, model: String, api_key: String, max_tokens: u32) -> Self {
        Self {
            model,
            api_key,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            max_tokens,
            http,
        }
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl LlmClient for OpenAiCompatibleClient {
    #[instrument(name = "llm_complete", skip_all, fields(model = %self.model))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let body = ChatRequestBody {
            model: &self.model,
            messages: &request.messages,
            max_tokens: self.max_tokens,
        };

        let start_time = Instant::now();
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| TravelerError::provider(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let snippet: String = text.chars().take(ERROR_BODY_LIMIT).collect();
            warn!(%status, body = %snippet, "LLM provider returned an error status");
            return Err(TravelerError::provider(format!(
                "Provider responded with {status}: {snippet}"
            )));
        }

        let parsed: ChatResponseBody = response
            .json()
            .await
            .map_err(|e| TravelerError::provider(format!("Invalid completion payload: {e}")))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content);

        debug!(
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            content_len = content.as_ref().map_or(0, String::len),
            "LLM completion received"
        );

        Ok(CompletionResponse { content })
    }
}
