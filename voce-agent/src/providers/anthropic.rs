//! Anthropic Messages API chat backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use voce_core::{ChatModel, Result, Role, Turn, VoiceError};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_MODEL: &str = "claude-3-5-haiku-latest";
const API_VERSION: &str = "2023-06-01";

/// Configuration for [`AnthropicChatModel`].
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// API key (`x-api-key` header).
    pub api_key: String,
    /// Model identifier.
    pub model: String,
    /// API base URL, without a trailing slash.
    pub base_url: String,
}

impl AnthropicConfig {
    /// Create a configuration with the given API key and defaults.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Read the configuration from the environment.
    ///
    /// Requires `ANTHROPIC_API_KEY`; honors a `VOCE_LLM_MODEL` override.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .map_err(|_| VoiceError::config("ANTHROPIC_API_KEY is not set"))?;
        let mut config = Self::new(api_key);
        if let Ok(model) = std::env::var("VOCE_LLM_MODEL") {
            config.model = model;
        }
        Ok(config)
    }

    /// Set the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: Role,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

/// Chat backend calling the Anthropic Messages API.
pub struct AnthropicChatModel {
    config: AnthropicConfig,
    client: reqwest::Client,
}

impl AnthropicChatModel {
    /// Create a chat model from a configuration.
    pub fn new(config: AnthropicConfig) -> Self {
        Self { config, client: reqwest::Client::new() }
    }
}

#[async_trait]
impl ChatModel for AnthropicChatModel {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, system: &str, turns: &[Turn], max_tokens: u32) -> Result<String> {
        let request = MessagesRequest {
            model: &self.config.model,
            max_tokens,
            system,
            messages: turns
                .iter()
                .map(|turn| WireMessage { role: turn.role, content: &turn.content })
                .collect(),
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.config.base_url))
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| VoiceError::completion(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VoiceError::completion(format!("HTTP {status}: {body}")));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| VoiceError::completion(format!("invalid response: {e}")))?;
        let reply: String = parsed
            .content
            .iter()
            .filter(|block| block.kind == "text")
            .map(|block| block.text.as_str())
            .collect();
        if reply.is_empty() {
            return Err(VoiceError::completion("response contained no text"));
        }
        Ok(reply)
    }
}
