//! Per-portal content providers.
//!
//! Each supported portal shape gets one provider variant; the registry
//! tries them in a fixed priority order and the first one whose
//! `can_handle` claims the URL/content wins. Order is load-bearing:
//! portal-specific variants (with their own redirect resolution or
//! cleanup) sit before the generic JSON-LD and Firecrawl fallbacks, so a
//! generic variant can never shadow a portal's custom logic.

mod boligsiden;
mod danbolig;
mod edc;
mod firecrawl;
mod home;
mod jsonld;

pub use boligsiden::BoligsidenProvider;
pub use danbolig::DanboligProvider;
pub use edc::EdcProvider;
pub use firecrawl::FirecrawlProvider;
pub use home::HomeProvider;
pub use jsonld::JsonLdProvider;

use crate::firecrawl::FirecrawlClient;

/// What one provider extracted from a listing page.
///
/// Fields are copied onto the listing record: `original_link` becomes the
/// redirect URL when it differs from the input, `extracted_text` feeds the
/// analyzer, and `property_image_url` is whatever image the provider found
/// while parsing (for Firecrawl this comes from scrape metadata, so it has
/// to travel with the parse result).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseResult {
    pub original_link: Option<String>,
    pub extracted_text: Option<String>,
    pub property_image_url: Option<String>,
}

/// Errors from provider selection.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("no provider could handle {url}")]
    NoProvider { url: String },
}

/// Closed set of provider variants behind one capability surface.
///
/// Specializations delegate instead of inheriting: [`EdcProvider`] holds a
/// [`JsonLdProvider`] and [`DanboligProvider`] holds a
/// [`FirecrawlProvider`], each calling into its inner variant explicitly.
pub enum Provider {
    Boligsiden(BoligsidenProvider),
    Home(HomeProvider),
    Danbolig(DanboligProvider),
    Edc(EdcProvider),
    JsonLd(JsonLdProvider),
    Firecrawl(FirecrawlProvider),
}

impl Provider {
    /// Human-readable identifier used in logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Boligsiden(_) => "Boligsiden.dk",
            Self::Home(_) => "Home.dk",
            Self::Danbolig(_) => "Danbolig",
            Self::Edc(_) => "EDC",
            Self::JsonLd(_) => "JSON-LD",
            Self::Firecrawl(_) => "Firecrawl",
        }
    }

    /// Cheap, side-effect-free capability check.
    ///
    /// `html` is only inspected by the content-sniffing variants (JSON-LD
    /// and its specializations); domain-matched variants ignore it.
    #[must_use]
    pub fn can_handle(&self, url: &str, html: Option<&str>) -> bool {
        match self {
            Self::Boligsiden(p) => p.can_handle(url),
            Self::Home(p) => p.can_handle(url),
            Self::Danbolig(p) => p.can_handle(url),
            Self::Edc(p) => p.can_handle(url, html),
            Self::JsonLd(p) => p.can_handle(html),
            Self::Firecrawl(p) => p.can_handle(),
        }
    }

    /// Extracts text, image, and original link from a listing page.
    ///
    /// May perform network I/O (redirect resolution, Firecrawl scraping).
    /// Providers degrade to an empty or error-annotated [`ParseResult`]
    /// instead of failing the pipeline.
    pub async fn parse(&self, url: &str, html: &str) -> ParseResult {
        match self {
            Self::Boligsiden(p) => p.parse(url, html).await,
            Self::Home(p) => p.parse(url, html),
            Self::Danbolig(p) => p.parse(url).await,
            Self::Edc(p) => p.parse(url, html),
            Self::JsonLd(p) => p.parse(url, html),
            Self::Firecrawl(p) => p.parse(url).await,
        }
    }

    /// Extracts the best candidate image from already-fetched HTML.
    #[must_use]
    pub fn extract_image(&self, html: &str, base_url: &str) -> Option<String> {
        match self {
            Self::Home(p) => p.extract_image(html, base_url),
            Self::Edc(p) => p.extract_image(html, base_url),
            Self::JsonLd(p) => p.extract_image(html, base_url),
            Self::Boligsiden(_) | Self::Danbolig(_) | Self::Firecrawl(_) => {
                crate::html::extract_image(html, base_url)
            }
        }
    }
}

/// Ordered provider list with process-wide lifetime.
///
/// Constructed once at startup and passed explicitly to whoever needs it;
/// there is no global registry.
pub struct ProviderRegistry {
    providers: Vec<Provider>,
}

impl ProviderRegistry {
    /// Builds the registry in priority order.
    ///
    /// `firecrawl` is `None` when no API key is configured; the Firecrawl
    /// variant (and the Danbolig specialization on top of it) then simply
    /// never claims a URL.
    #[must_use]
    pub fn new(
        http: reqwest::Client,
        fetch_timeout_secs: u64,
        user_agent: String,
        firecrawl: Option<FirecrawlClient>,
    ) -> Self {
        let firecrawl_provider = FirecrawlProvider::new(firecrawl);

        let providers = vec![
            Provider::Boligsiden(BoligsidenProvider::new(
                http,
                fetch_timeout_secs,
                user_agent,
            )),
            Provider::Home(HomeProvider::new()),
            Provider::Danbolig(DanboligProvider::new(firecrawl_provider.clone())),
            Provider::Edc(EdcProvider::new(JsonLdProvider::new())),
            Provider::JsonLd(JsonLdProvider::new()),
            Provider::Firecrawl(firecrawl_provider),
        ];

        Self { providers }
    }

    /// Returns the first provider that claims the URL/content.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::NoProvider`] when every variant declines.
    pub fn get_provider_for_content(
        &self,
        url: &str,
        html: Option<&str>,
    ) -> Result<&Provider, ProviderError> {
        for provider in &self.providers {
            if provider.can_handle(url, html) {
                tracing::info!(provider = provider.name(), url, "selected provider");
                return Ok(provider);
            }
        }
        tracing::warn!(url, "no provider claimed the URL");
        Err(ProviderError::NoProvider {
            url: url.to_owned(),
        })
    }

    /// Number of registered providers, in priority order.
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const JSONLD_HTML: &str = r#"
        <html><head>
        <script type="application/ld+json">{"@type": "Product", "name": "Byvej 1"}</script>
        </head><body><p>tekst</p></body></html>
    "#;

    fn registry(firecrawl: Option<FirecrawlClient>) -> ProviderRegistry {
        ProviderRegistry::new(
            reqwest::Client::new(),
            30,
            "test-agent".to_owned(),
            firecrawl,
        )
    }

    fn firecrawl_client() -> FirecrawlClient {
        FirecrawlClient::with_base_url("fc-test", "http://localhost:9").expect("client")
    }

    #[test]
    fn boligsiden_urls_pick_the_boligsiden_provider() {
        let registry = registry(None);
        let provider = registry
            .get_provider_for_content("https://www.boligsiden.dk/adresse/byvej-1?udbud=abc", None)
            .unwrap();
        assert_eq!(provider.name(), "Boligsiden.dk");
    }

    #[test]
    fn edc_with_jsonld_beats_the_generic_jsonld_provider() {
        let registry = registry(None);
        let provider = registry
            .get_provider_for_content("https://www.edc.dk/bolig/byvej-1", Some(JSONLD_HTML))
            .unwrap();
        assert_eq!(provider.name(), "EDC");
    }

    #[test]
    fn edc_without_jsonld_falls_through() {
        let registry = registry(None);
        let html = "<html><body><p>no structured data</p></body></html>";
        let result = registry.get_provider_for_content("https://www.edc.dk/bolig/1", Some(html));
        // Neither EDC (needs JSON-LD) nor the generic variants claim it when
        // Firecrawl is unconfigured.
        assert!(matches!(result, Err(ProviderError::NoProvider { .. })));
    }

    #[test]
    fn danbolig_beats_generic_firecrawl_when_configured() {
        let registry = registry(Some(firecrawl_client()));
        let provider = registry
            .get_provider_for_content("https://www.danbolig.dk/bolig/1", None)
            .unwrap();
        assert_eq!(provider.name(), "Danbolig");
    }

    #[test]
    fn danbolig_is_disabled_without_firecrawl() {
        let registry = registry(None);
        let html = "<html><body></body></html>";
        let result =
            registry.get_provider_for_content("https://www.danbolig.dk/bolig/1", Some(html));
        assert!(matches!(result, Err(ProviderError::NoProvider { .. })));
    }

    #[test]
    fn unknown_domain_with_jsonld_uses_the_generic_jsonld_provider() {
        let registry = registry(None);
        let provider = registry
            .get_provider_for_content("https://www.estate.dk/bolig/1", Some(JSONLD_HTML))
            .unwrap();
        assert_eq!(provider.name(), "JSON-LD");
    }

    #[test]
    fn firecrawl_is_the_last_resort_when_configured() {
        let registry = registry(Some(firecrawl_client()));
        let html = "<html><body><p>plain page</p></body></html>";
        let provider = registry
            .get_provider_for_content("https://www.estate.dk/bolig/1", Some(html))
            .unwrap();
        assert_eq!(provider.name(), "Firecrawl");
    }

    #[test]
    fn registry_has_fixed_priority_order() {
        let registry = registry(None);
        assert_eq!(registry.len(), 6);
    }
}
