//! HTTP fetching for listing pages.

use std::time::Duration;

use thiserror::Error;

/// Errors raised while fetching a listing page.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("HTTP error fetching {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },
}

impl FetchError {
    pub(crate) fn from_reqwest(url: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout {
                url: url.to_owned(),
            }
        } else {
            Self::Http {
                url: url.to_owned(),
                source,
            }
        }
    }

    /// `true` when the failure was a timeout rather than a hard error.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Builds the shared HTTP client used for all listing fetches.
///
/// Redirects are followed (the aggregator resolution in the Boligsiden
/// provider depends on this) and each request carries its own timeout.
///
/// # Errors
///
/// Returns [`reqwest::Error`] if the client cannot be constructed.
pub fn build_http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .build()
}

/// Fetches the HTML body of a listing page.
///
/// Sends a browser-like user-agent: several of the supported portals serve
/// reduced or empty markup to obvious bot user-agents.
///
/// # Errors
///
/// - [`FetchError::Timeout`] when the request exceeds `timeout_secs`.
/// - [`FetchError::UnexpectedStatus`] on a non-2xx response.
/// - [`FetchError::Http`] on connection-level failures.
pub async fn fetch_html(
    client: &reqwest::Client,
    url: &str,
    timeout_secs: u64,
    user_agent: &str,
) -> Result<String, FetchError> {
    let response = client
        .get(url)
        .timeout(Duration::from_secs(timeout_secs))
        .header(reqwest::header::USER_AGENT, user_agent)
        .header(reqwest::header::ACCEPT, "text/html,application/xhtml+xml")
        .send()
        .await
        .map_err(|e| FetchError::from_reqwest(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_owned(),
        });
    }

    response
        .text()
        .await
        .map_err(|e| FetchError::from_reqwest(url, e))
}
