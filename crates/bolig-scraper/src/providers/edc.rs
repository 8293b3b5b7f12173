//! Provider for EDC.dk: a domain-pinned specialization of the JSON-LD
//! provider. EDC publishes complete schema.org data, so the generic
//! JSON-LD extraction is reused as-is behind a stricter capability check.

use super::jsonld::JsonLdProvider;
use super::ParseResult;
use crate::urlutil::extract_site_domain;

pub struct EdcProvider {
    json_ld: JsonLdProvider,
}

impl EdcProvider {
    #[must_use]
    pub fn new(json_ld: JsonLdProvider) -> Self {
        Self { json_ld }
    }

    /// EDC pages are only claimed when they actually carry JSON-LD; an EDC
    /// page without it falls through to the later generic variants.
    #[must_use]
    pub fn can_handle(&self, url: &str, html_content: Option<&str>) -> bool {
        let is_edc = extract_site_domain(url).is_some_and(|domain| domain == "edc.dk");
        if !is_edc {
            return false;
        }
        let has_json_ld = self.json_ld.can_handle(html_content);
        if !has_json_ld {
            tracing::debug!(url, "URL is edc.dk but no JSON-LD found");
        }
        has_json_ld
    }

    #[must_use]
    pub fn parse(&self, url: &str, html_content: &str) -> ParseResult {
        self.json_ld.parse(url, html_content)
    }

    #[must_use]
    pub fn extract_image(&self, html_content: &str, base_url: &str) -> Option<String> {
        self.json_ld.extract_image(html_content, base_url)
    }
}
