//! OpenAI-compatible chat completion client

use crate::capability::ModelCapability;
use crate::error::LlmError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

/// Connection settings for an OpenAI-compatible endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpModelConfig {
    /// Base URL, e.g. `https://api.example.com/v1`
    pub base_url: String,
    /// Model name sent with every request
    pub model: String,
    /// Bearer token
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Sampling temperature
    pub temperature: f32,
}

impl HttpModelConfig {
    /// Create config for an endpoint and model
    #[inline]
    #[must_use]
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            ..Self::default()
        }
    }

    /// With bearer token
    #[inline]
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// With request timeout
    #[inline]
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

impl Default for HttpModelConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434/v1".to_string(),
            model: "qwen2.5:14b".to_string(),
            api_key: None,
            timeout_secs: 60,
            temperature: 0.2,
        }
    }
}

/// Model capability backed by an HTTP endpoint
#[derive(Debug, Clone)]
pub struct HttpModelClient {
    client: reqwest::Client,
    config: HttpModelConfig,
}

impl HttpModelClient {
    /// Create client
    ///
    /// # Errors
    /// `LlmError::Transport` if the HTTP client cannot be built.
    pub fn new(config: HttpModelConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Transport(e.to_string()))?;
        Ok(Self { client, config })
    }

    /// Get configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &HttpModelConfig {
        &self.config
    }

    fn map_error(&self, error: &reqwest::Error) -> LlmError {
        if error.is_timeout() {
            LlmError::Timeout {
                duration_secs: self.config.timeout_secs,
            }
        } else if let Some(status) = error.status() {
            LlmError::Status {
                code: status.as_u16(),
            }
        } else {
            LlmError::Transport(error.to_string())
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
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

#[async_trait]
impl ModelCapability for HttpModelClient {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, LlmError> {
        let body = json!({
            "model": self.config.model,
            "temperature": self.config.temperature,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": user_prompt },
            ],
        });

        let mut request = self.client.post(self.config.endpoint()).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        tracing::debug!(model = %self.config.model, "sending completion request");
        let response = request
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| self.map_error(&e))?;

        let parsed: ChatResponse = response.json().await.map_err(|e| self.map_error(&e))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| LlmError::Decode {
                reason: "completion carried no message content".to_string(),
            })
    }
}
