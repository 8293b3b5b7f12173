//! Client for the Firecrawl scraping API.
//!
//! Firecrawl fetches and renders a page server-side and hands back markdown
//! plus page metadata. The service is the last-resort extraction path for
//! portals without a dedicated provider, so the client stays deliberately
//! small: one `/v1/scrape` call, markdown format only.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

const DEFAULT_BASE_URL: &str = "https://api.firecrawl.dev";
const SCRAPE_TIMEOUT_SECS: u64 = 60;

/// Errors returned by the Firecrawl API client.
#[derive(Debug, Error)]
pub enum FirecrawlError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from Firecrawl")]
    UnexpectedStatus { status: u16 },

    #[error("Firecrawl API error: {0}")]
    ApiError(String),

    #[error("Firecrawl returned no markdown content for {url}")]
    NoContent { url: String },
}

/// Markdown plus metadata for one scraped page.
#[derive(Debug, Clone)]
pub struct ScrapeData {
    pub markdown: String,
    /// Raw metadata object (og/twitter tags, title, etc.) as Firecrawl
    /// reports it. Keys are not stable across sites, so this stays untyped.
    pub metadata: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ScrapeEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<ScrapePayload>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ScrapePayload {
    #[serde(default)]
    markdown: Option<String>,
    #[serde(default)]
    metadata: serde_json::Value,
}

/// Client for the Firecrawl scrape endpoint.
///
/// Use [`FirecrawlClient::new`] for production or
/// [`FirecrawlClient::with_base_url`] to point at a mock server in tests.
#[derive(Debug, Clone)]
pub struct FirecrawlClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl FirecrawlClient {
    /// Creates a client pointed at the production Firecrawl API.
    ///
    /// # Errors
    ///
    /// Returns [`FirecrawlError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str) -> Result<Self, FirecrawlError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`FirecrawlError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_base_url(api_key: &str, base_url: &str) -> Result<Self, FirecrawlError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(SCRAPE_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Scrapes one URL, returning its markdown rendition and metadata.
    ///
    /// # Errors
    ///
    /// - [`FirecrawlError::UnexpectedStatus`] on a non-2xx response.
    /// - [`FirecrawlError::ApiError`] when the envelope reports failure.
    /// - [`FirecrawlError::NoContent`] when no markdown came back.
    /// - [`FirecrawlError::Http`] on network failure.
    pub async fn scrape(&self, url: &str) -> Result<ScrapeData, FirecrawlError> {
        let endpoint = format!("{}/v1/scrape", self.base_url);
        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.api_key)
            .json(&json!({ "url": url, "formats": ["markdown"] }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FirecrawlError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        let envelope: ScrapeEnvelope = response.json().await?;
        if !envelope.success {
            let reason = envelope
                .error
                .unwrap_or_else(|| "no error detail provided".to_owned());
            return Err(FirecrawlError::ApiError(reason));
        }

        let payload = envelope.data.ok_or_else(|| FirecrawlError::NoContent {
            url: url.to_owned(),
        })?;
        let markdown = payload
            .markdown
            .filter(|m| !m.is_empty())
            .ok_or_else(|| FirecrawlError::NoContent {
                url: url.to_owned(),
            })?;

        Ok(ScrapeData {
            markdown,
            metadata: payload.metadata,
        })
    }
}
