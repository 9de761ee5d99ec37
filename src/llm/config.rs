//! Message generation configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the outreach message generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Chat-completions endpoint base URL.
    pub endpoint: String,

    /// Model identifier.
    pub model: String,

    /// API key, sourced from the environment. Absence is not an error:
    /// generation degrades to the templated fallback.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    pub temperature: f32,

    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            api_key: None,
            temperature: 0.7,
            max_tokens: 200,
        }
    }
}
