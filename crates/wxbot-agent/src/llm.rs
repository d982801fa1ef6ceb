//! Generative-text fallback for non-weather questions.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;
use wxbot_core::LlmConfig;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("No API key configured")]
    MissingApiKey,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("LLM API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("LLM response contained no text")]
    EmptyResponse,

    #[error("Failed to parse LLM response: {0}")]
    Parse(String),
}

impl LlmError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::MissingApiKey => "The assistant is not configured. Set an API key.",
            Self::Network(_) => "Unable to reach the assistant. Please try again.",
            Self::Api { status, .. } if *status == 429 => {
                "The assistant is busy. Please wait and try again."
            }
            Self::Api { .. } => "The assistant request failed. Please try again.",
            Self::EmptyResponse | Self::Parse(_) => "The assistant returned an unexpected reply.",
        }
    }
}

/// A single-turn text completion service.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send `message` as one user turn and return the reply text.
    async fn complete(&self, message: &str) -> Result<String, LlmError>;
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

/// Anthropic Messages API client
pub struct AnthropicClient {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
    api_version: String,
}

impl AnthropicClient {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            api_version: config.api_version.clone(),
        })
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    #[instrument(skip(self, message), fields(model = %self.model), level = "info")]
    async fn complete(&self, message: &str) -> Result<String, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingApiKey)?;

        let request = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: [Message {
                role: "user",
                content: message,
            }],
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", api_key)
            .header("anthropic-version", &self.api_version)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!("LLM API returned {}", status);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        body.content
            .into_iter()
            .next()
            .and_then(|block| block.text)
            .ok_or(LlmError::EmptyResponse)
    }
}
