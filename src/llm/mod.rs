//! Outreach message generation.
//!
//! Wraps an OpenAI-compatible chat-completions endpoint. Generation is a
//! boundary that must never propagate a failure: any internal error
//! degrades to a deterministic templated message.

mod config;
pub mod prompts;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub use config::LlmConfig;

use crate::models::ProfileRecord;

/// Chat-completions client for outreach messages.
pub struct MessageClient {
    config: LlmConfig,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

impl MessageClient {
    pub fn new(config: LlmConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");
        Self { config, client }
    }

    /// Generate an outreach message for a profile.
    ///
    /// Never fails: without an API key, or on any transport or parse
    /// error, the deterministic template takes over.
    pub async fn generate_message(&self, record: &ProfileRecord) -> String {
        match self.call_completion(record).await {
            Ok(message) if !message.is_empty() => message,
            Ok(_) => {
                warn!("Message generation returned empty content, using fallback");
                prompts::fallback_message(record)
            }
            Err(LlmError::MissingApiKey) => {
                debug!("No API key configured, using templated message");
                prompts::fallback_message(record)
            }
            Err(e) => {
                warn!("Message generation failed, using fallback: {}", e);
                prompts::fallback_message(record)
            }
        }
    }

    async fn call_completion(&self, record: &ProfileRecord) -> Result<String, LlmError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(LlmError::MissingApiKey)?;

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: prompts::SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompts::build_prompt(record),
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let url = format!("{}/chat/completions", self.config.endpoint.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let excerpt: String = body.chars().take(200).collect();
            return Err(LlmError::Api(format!("HTTP {status}: {excerpt}")));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        let message = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .unwrap_or_default();

        Ok(message)
    }
}

/// Errors internal to message generation. Callers of
/// [`MessageClient::generate_message`] never see these.
#[derive(Debug, Error)]
enum LlmError {
    #[error("no API key configured")]
    MissingApiKey,
    #[error("connection error: {0}")]
    Connection(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_api_key_degrades_to_template() {
        let client = MessageClient::new(LlmConfig::default());
        let record = ProfileRecord {
            full_name: Some("Jane Doe".to_string()),
            current_title: Some("Engineer".to_string()),
            current_organization: Some("Acme".to_string()),
            ..ProfileRecord::new("jane-doe")
        };
        let message = client.generate_message(&record).await;
        assert!(message.starts_with("Hey Jane,"));
        assert!(message.contains("Engineer at Acme"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_degrades_to_template() {
        let config = LlmConfig {
            endpoint: "http://127.0.0.1:1".to_string(),
            api_key: Some("test-key".to_string()),
            ..LlmConfig::default()
        };
        let client = MessageClient::new(config);
        let message = client.generate_message(&ProfileRecord::new("ghost")).await;
        assert!(message.starts_with("Hey there,"));
    }
}
