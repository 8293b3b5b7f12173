//! Last-resort provider delegating fetch + parse to the Firecrawl service.
//!
//! Firecrawl re-fetches the page itself, so the HTML already downloaded by
//! the pipeline is ignored. Service failures are folded into the extracted
//! text rather than raised, so downstream always receives *some* text.

use std::sync::LazyLock;

use regex::Regex;

use super::ParseResult;
use crate::firecrawl::FirecrawlClient;

/// First image link in a markdown body: `![alt](https://...)`.
static MARKDOWN_IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[.*?\]\((https?://[^)]+)\)").expect("valid regex"));

#[derive(Clone)]
pub struct FirecrawlProvider {
    client: Option<FirecrawlClient>,
}

impl FirecrawlProvider {
    /// `client` is `None` when no API key is configured; the provider then
    /// declines every URL.
    #[must_use]
    pub fn new(client: Option<FirecrawlClient>) -> Self {
        if client.is_none() {
            tracing::warn!("Firecrawl API key not configured; Firecrawl provider disabled");
        }
        Self { client }
    }

    #[must_use]
    pub fn can_handle(&self) -> bool {
        self.client.is_some()
    }

    pub async fn parse(&self, url: &str) -> ParseResult {
        let Some(client) = &self.client else {
            return ParseResult {
                original_link: None,
                extracted_text: Some("Firecrawl service not configured".to_owned()),
                property_image_url: None,
            };
        };

        tracing::info!(url, "scraping URL with Firecrawl");
        match client.scrape(url).await {
            Ok(data) => {
                let property_image_url = metadata_image_url(&data.metadata)
                    .or_else(|| first_markdown_image(&data.markdown));
                tracing::info!(
                    url,
                    image = property_image_url.as_deref().unwrap_or("none"),
                    "Firecrawl scrape succeeded"
                );
                ParseResult {
                    original_link: None,
                    extracted_text: Some(data.markdown),
                    property_image_url,
                }
            }
            Err(error) => {
                tracing::error!(url, error = %error, "Firecrawl scrape failed");
                ParseResult {
                    original_link: None,
                    extracted_text: Some(format!(
                        "Failed to scrape content from {url} using Firecrawl: {error}"
                    )),
                    property_image_url: None,
                }
            }
        }
    }
}

/// Image URL from Firecrawl metadata, in the order the fields are trusted:
/// `ogImage`, `og:image`, a `twitter` object's `image`, `twitter:image`.
fn metadata_image_url(metadata: &serde_json::Value) -> Option<String> {
    for key in ["ogImage", "og:image"] {
        if let Some(url) = metadata[key].as_str().filter(|u| !u.is_empty()) {
            return Some(url.to_owned());
        }
    }
    if let Some(url) = metadata["twitter"]["image"].as_str().filter(|u| !u.is_empty()) {
        return Some(url.to_owned());
    }
    metadata["twitter:image"]
        .as_str()
        .filter(|u| !u.is_empty())
        .map(ToOwned::to_owned)
}

fn first_markdown_image(markdown: &str) -> Option<String> {
    MARKDOWN_IMAGE
        .captures(markdown)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_owned())
}
