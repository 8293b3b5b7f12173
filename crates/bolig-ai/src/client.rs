//! HTTP client for the Claude Messages API.
//!
//! One operation: send a transcript plus tool definitions, get back a list
//! of content blocks. Rate limiting (429) is the only transparently retried
//! condition: a fixed small number of attempts with a fixed delay, then
//! [`AiError::RateLimited`] surfaces to the pipeline.

use std::time::Duration;

use serde_json::json;

use crate::error::AiError;
use crate::tools::ToolDefinition;
use crate::types::{MessageParam, MessageResponse};

const ANTHROPIC_VERSION: &str = "2023-06-01";

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20240620";
const DEFAULT_MAX_TOKENS: u32 = 4096;
const DEFAULT_TEMPERATURE: f32 = 0.5;
const DEFAULT_TIMEOUT_SECS: u64 = 180;
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_RETRY_DELAY_SECS: u64 = 5;

/// Settings for the Claude client.
#[derive(Clone)]
pub struct ClaudeConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_delay_secs: u64,
}

impl ClaudeConfig {
    #[must_use]
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_owned(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay_secs: DEFAULT_RETRY_DELAY_SECS,
        }
    }

    /// Points the client at a custom base URL (for testing with wiremock).
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_owned();
        self
    }

    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, retry_delay_secs: u64) -> Self {
        self.max_retries = max_retries;
        self.retry_delay_secs = retry_delay_secs;
        self
    }
}

impl std::fmt::Debug for ClaudeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaudeConfig")
            .field("api_key", &"[redacted]")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_delay_secs", &self.retry_delay_secs)
            .finish()
    }
}

/// Client for the Claude Messages API.
#[derive(Debug, Clone)]
pub struct ClaudeClient {
    config: ClaudeConfig,
    http: reqwest::Client,
}

impl ClaudeClient {
    /// Builds the client from its configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AiError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed.
    pub fn new(config: ClaudeConfig) -> Result<Self, AiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { config, http })
    }

    /// Sends one `create message` request, retrying on rate limits.
    ///
    /// # Errors
    ///
    /// - [`AiError::RateLimited`] once 429 responses exhaust the retries.
    /// - [`AiError::UnexpectedStatus`] on any other non-2xx response.
    /// - [`AiError::Http`] on network failure or an unparseable body.
    pub async fn create_message(
        &self,
        messages: &[MessageParam],
        tools: &[ToolDefinition],
    ) -> Result<MessageResponse, AiError> {
        let url = format!("{}/v1/messages", self.config.base_url);
        let body = json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "messages": messages,
            "tools": tools,
        });

        let mut attempt = 0u32;
        loop {
            let response = self
                .http
                .post(&url)
                .header("x-api-key", &self.config.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .json(&body)
                .send()
                .await?;

            let status = response.status();
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                if attempt >= self.config.max_retries {
                    tracing::error!(
                        attempts = attempt + 1,
                        "Claude API rate limit persisted through all retries"
                    );
                    return Err(AiError::RateLimited);
                }
                attempt += 1;
                tracing::warn!(
                    attempt,
                    max_retries = self.config.max_retries,
                    delay_secs = self.config.retry_delay_secs,
                    "Claude API rate limited; retrying"
                );
                tokio::time::sleep(Duration::from_secs(self.config.retry_delay_secs)).await;
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(AiError::UnexpectedStatus {
                    status: status.as_u16(),
                    body,
                });
            }

            return Ok(response.json::<MessageResponse>().await?);
        }
    }
}
