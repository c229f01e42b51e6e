//! LLM client module
//!
//! A single stateless chat-completion call per request. No retries and no
//! streaming: a failed call is reported to the caller as a provider error.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

mod openai;

pub use openai::OpenAiCompatibleClient;

use crate::Result;
use crate::config::LlmConfig;

/// Message author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
}

/// One chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user<S: Into<String>>(content: S) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Request for a single completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub messages: Vec<Message>,
}

/// Text of the first choice, if the provider returned any
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompletionResponse {
    pub content: Option<String>,
}

/// Stateless chat-completion client. Each call is independent.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send one completion request. Implementations must not retry.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;
}

/// Create the configured LLM client
pub fn create_client(config: &LlmConfig) -> anyhow::Result<Arc<dyn LlmClient>> {
    debug!(base_url = %config.base_url, model = %config.model, "Creating LLM client");
    Ok(Arc::new(OpenAiCompatibleClient::from_config(config)?))
}


#[cfg(test)]
mod tests {
    use super::mock::MockLlmClient;
    use super::*;

    #[test]
    fn test_user_message_serializes_lowercase_role() {
        let value = serde_json::to_value(Message::user("hello")).unwrap();
        assert_eq!(value, serde_json::json!({"role": "user", "content": "hello"}));
    }

    #[tokio::test]
    async fn test_mock_client_records_requests() {
        let client = MockLlmClient::answering("{}");
        let request = CompletionRequest {
            messages: vec![Message::user("hello")],
        };

        let response = client.complete(request.clone()).await.unwrap();
        assert_eq!(response.content.as_deref(), Some("{}"));
        assert_eq!(client.call_count(), 1);
        assert_eq!(client.last_request(), Some(request));
    }

    #[tokio::test]
    async fn test_mock_client_failure() {
        let client = MockLlmClient::failing("rate limited");
        let request = CompletionRequest { messages: vec![] };
        assert!(client.complete(request).await.is_err());
    }
}
