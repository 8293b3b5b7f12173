//! Integration tests for Boligsiden redirect resolution using wiremock.
//!
//! The provider issues a HEAD request against the `viderestilling` endpoint
//! and reports the URL the HTTP client ends up on after following redirects.

use bolig_scraper::providers::BoligsidenProvider;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider(redirect_base: &str) -> BoligsidenProvider {
    BoligsidenProvider::with_redirect_base(
        reqwest::Client::new(),
        5,
        "test-agent".to_owned(),
        redirect_base,
    )
}

#[tokio::test]
async fn resolves_redirect_to_realtor_page() {
    let server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/viderestilling/abc-123"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("Location", "/realtor/byvej-1"),
        )
        .mount(&server)
        .await;

    Mock::given(method("HEAD"))
        .and(path("/realtor/byvej-1"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let provider = provider(&server.uri());
    let resolved = provider
        .resolve_source_url("https://www.boligsiden.dk/adresse/byvej-1?udbud=abc-123")
        .await
        .expect("redirect should resolve");

    assert_eq!(resolved, format!("{}/realtor/byvej-1", server.uri()));
}

#[tokio::test]
async fn unresolved_redirect_chain_yields_none() {
    let server = MockServer::start().await;

    // The endpoint answers 200 directly: the chain never escapes the
    // resolver, so resolution must fail rather than loop back on itself.
    Mock::given(method("HEAD"))
        .and(path("/viderestilling/abc-123"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let provider = provider(&server.uri());
    let resolved = provider
        .resolve_source_url("https://www.boligsiden.dk/adresse/byvej-1?udbud=abc-123")
        .await;

    assert_eq!(resolved, None);
}

#[tokio::test]
async fn error_status_from_resolver_yields_none() {
    let server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/viderestilling/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let provider = provider(&server.uri());
    let resolved = provider
        .resolve_source_url("https://www.boligsiden.dk/adresse/byvej-1?udbud=missing")
        .await;

    assert_eq!(resolved, None);
}
