//! Language model collaborator.
//!
//! The pipeline treats the model as text in, text out. [`ChatCompletionsModel`]
//! talks to any OpenAI-compatible `/chat/completions` endpoint; tests substitute
//! their own [`LanguageModel`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::client::HttpClient;
use crate::config::{Config, LlmConfig};
use crate::error::{ConfigError, LlmError};

/// A text-generation model.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate a completion for `prompt` under `system_prompt`.
    async fn generate(&self, system_prompt: &str, prompt: &str) -> Result<String, LlmError>;
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible chat completions client.
#[derive(Debug, Clone)]
pub struct ChatCompletionsModel {
    http: HttpClient,
    endpoint: String,
    settings: LlmConfig,
}

impl ChatCompletionsModel {
    /// Create a client for the configured endpoint.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        if config.llm.api_key.is_none() {
            warn!(model = %config.llm.model, "No LLM API key configured");
        }

        let mut headers = HeaderMap::new();
        headers.insert("X-Title", reqwest::header::HeaderValue::from_static("PaperSurveyAgent"));

        let http = HttpClient::new(config, headers, config.request_timeout, Duration::ZERO)?;
        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", config.llm.base_url.trim_end_matches('/')),
            settings: config.llm.clone(),
        })
    }

    /// Model name sent with each request.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.settings.model
    }
}

#[async_trait]
impl LanguageModel for ChatCompletionsModel {
    async fn generate(&self, system_prompt: &str, prompt: &str) -> Result<String, LlmError> {
        let body = serde_json::json!({
            "model": self.settings.model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": prompt},
            ],
            "temperature": self.settings.temperature,
            "max_tokens": self.settings.max_tokens,
        });

        debug!(
            model = %self.settings.model,
            prompt_chars = prompt.len(),
            "Sending completion request"
        );
        let response: ChatResponse =
            self.http.post_json(&self.endpoint, &body, self.settings.api_key.as_deref()).await?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::Malformed("response has no choices".to_string()))?;

        let content = choice.message.content.unwrap_or_default();
        let content = content.trim();
        if content.is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(content.to_string())
    }
}
