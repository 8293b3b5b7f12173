//! Provider for the Boligsiden.dk aggregator.
//!
//! Boligsiden pages are search-result shells; the realtor's own listing
//! sits behind the `viderestilling` redirect endpoint keyed by the `udbud`
//! query parameter. Resolution uses a HEAD request so the realtor page body
//! is not downloaded twice.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use url::Url;

use super::ParseResult;
use crate::html;
use crate::urlutil::extract_site_domain;

const REDIRECT_BASE: &str = "https://www.boligsiden.dk";
/// Path segment of the redirect endpoint; a resolved URL that still
/// contains it means the redirect chain never escaped the resolver.
const REDIRECT_PATH: &str = "/viderestilling";

/// Boilerplate fragments Boligsiden injects into every listing page.
static BOILERPLATE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(
            r"(?i)Se hvilke internetforbindelser, der er tilgængelige på adressen\. Bemærk, at mobildækning ikke er oplyst\.",
        )
        .expect("valid regex"),
        Regex::new(r"(?i)RadonrisikoRadonrisikoen vurderes til at være ukendtUkendt")
            .expect("valid regex"),
    ]
});

pub struct BoligsidenProvider {
    http: reqwest::Client,
    timeout_secs: u64,
    user_agent: String,
    redirect_base: String,
}

impl BoligsidenProvider {
    #[must_use]
    pub fn new(http: reqwest::Client, timeout_secs: u64, user_agent: String) -> Self {
        Self::with_redirect_base(http, timeout_secs, user_agent, REDIRECT_BASE)
    }

    /// Overrides the redirect endpoint host (for testing with wiremock).
    #[must_use]
    pub fn with_redirect_base(
        http: reqwest::Client,
        timeout_secs: u64,
        user_agent: String,
        redirect_base: &str,
    ) -> Self {
        Self {
            http,
            timeout_secs,
            user_agent,
            redirect_base: redirect_base.trim_end_matches('/').to_owned(),
        }
    }

    #[must_use]
    pub fn can_handle(&self, url: &str) -> bool {
        extract_site_domain(url).is_some_and(|domain| domain == "boligsiden.dk")
    }

    /// Resolves the aggregator listing to the underlying realtor page.
    ///
    /// Returns `None` when the URL carries no `udbud` id (a valid terminal
    /// state, since not every aggregator URL is resolvable), when the HEAD
    /// request fails, or when the redirect chain never left the resolver
    /// endpoint.
    pub async fn resolve_source_url(&self, url: &str) -> Option<String> {
        let parsed = Url::parse(url).ok()?;
        let case_id = parsed
            .query_pairs()
            .find(|(key, value)| key == "udbud" && !value.is_empty())
            .map(|(_, value)| value.into_owned())?;

        let redirect_url = format!("{}{REDIRECT_PATH}/{case_id}", self.redirect_base);
        tracing::info!(redirect_url, "following Boligsiden redirect");

        let response = match self
            .http
            .head(&redirect_url)
            .timeout(Duration::from_secs(self.timeout_secs))
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .send()
            .await
        {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!(redirect_url, error = %error, "redirect HEAD request failed");
                return None;
            }
        };
        if !response.status().is_success() {
            tracing::warn!(
                redirect_url,
                status = response.status().as_u16(),
                "redirect endpoint returned an error status"
            );
            return None;
        }

        let final_url = response.url().to_string();
        if final_url.contains(REDIRECT_PATH) {
            tracing::warn!(url, final_url, "redirect did not resolve away from the resolver");
            return None;
        }

        tracing::info!(url, final_url, "resolved Boligsiden redirect");
        Some(final_url)
    }

    pub async fn parse(&self, url: &str, html_content: &str) -> ParseResult {
        let property_image_url = html::extract_image(html_content, url);
        let extracted_text = strip_boilerplate(&html::extract_text(html_content));
        let original_link = self.resolve_source_url(url).await;

        ParseResult {
            original_link,
            extracted_text: Some(extracted_text),
            property_image_url,
        }
    }
}

/// Removes known Boligsiden boilerplate and re-collapses whitespace.
fn strip_boilerplate(text: &str) -> String {
    let mut cleaned = text.to_owned();
    for pattern in BOILERPLATE_PATTERNS.iter() {
        cleaned = pattern.replace_all(&cleaned, "").into_owned();
    }
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}
