//! Provider for Danbolig.dk: Firecrawl scraping plus site-specific
//! markdown cleanup.
//!
//! Danbolig's rendered markdown is bracketed by a cookie-consent banner at
//! the top and a "Kontakt os" section at the bottom; everything between the
//! two markers is the actual listing.

use super::firecrawl::FirecrawlProvider;
use super::ParseResult;
use crate::urlutil::extract_site_domain;

/// Tail of the cookie-consent banner; the listing starts right after its
/// last occurrence.
const START_MARKER: &str = "Kun nødvendige formålOK til valgteTilpas";
/// Heading that opens the contact boilerplate at the bottom of the page.
const END_MARKER: &str = "## Kontakt os";

pub struct DanboligProvider {
    firecrawl: FirecrawlProvider,
}

impl DanboligProvider {
    #[must_use]
    pub fn new(firecrawl: FirecrawlProvider) -> Self {
        Self { firecrawl }
    }

    /// Claims danbolig.dk URLs, but only while the Firecrawl delegate is
    /// configured; without it there is nothing to parse with.
    #[must_use]
    pub fn can_handle(&self, url: &str) -> bool {
        if !self.firecrawl.can_handle() {
            return false;
        }
        extract_site_domain(url).is_some_and(|domain| domain == "danbolig.dk")
    }

    pub async fn parse(&self, url: &str) -> ParseResult {
        let mut result = self.firecrawl.parse(url).await;
        if let Some(text) = result.extracted_text.take() {
            result.extracted_text = Some(clean_markdown(&text));
        }
        result
    }
}

/// Slices the markdown between the last start marker and the last end
/// marker. Absent or inverted markers leave the text unchanged; marker
/// confusion must never produce an empty result.
fn clean_markdown(markdown: &str) -> String {
    let start = markdown
        .rfind(START_MARKER)
        .map_or(0, |idx| idx + START_MARKER.len());
    let end = markdown.rfind(END_MARKER).unwrap_or(markdown.len());

    if start >= end {
        tracing::warn!("Danbolig markdown markers absent or inverted; keeping original text");
        return markdown.to_owned();
    }

    markdown[start..end].trim().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slices_between_markers() {
        let markdown = format!("cookie banner {START_MARKER}\nDejlig villa på Byvej 1\n{END_MARKER}\nRing til os");
        assert_eq!(clean_markdown(&markdown), "Dejlig villa på Byvej 1");
    }

    #[test]
    fn uses_last_occurrence_of_start_marker() {
        let markdown =
            format!("{START_MARKER} første banner {START_MARKER}\nSelve annoncen\n{END_MARKER}");
        assert_eq!(clean_markdown(&markdown), "Selve annoncen");
    }

    #[test]
    fn missing_start_marker_keeps_head() {
        let markdown = format!("Annonce uden banner\n{END_MARKER}\nKontaktinfo");
        assert_eq!(clean_markdown(&markdown), "Annonce uden banner");
    }

    #[test]
    fn missing_end_marker_keeps_tail() {
        let markdown = format!("{START_MARKER}\nAnnonce uden kontaktsektion");
        assert_eq!(clean_markdown(&markdown), "Annonce uden kontaktsektion");
    }

    #[test]
    fn missing_both_markers_returns_original() {
        assert_eq!(clean_markdown("Ren tekst"), "Ren tekst");
    }

    #[test]
    fn inverted_markers_return_original() {
        let markdown = format!("{END_MARKER} forkert rækkefølge {START_MARKER}");
        assert_eq!(clean_markdown(&markdown), markdown);
    }

    #[test]
    fn unconfigured_firecrawl_disables_the_provider() {
        let provider = DanboligProvider::new(FirecrawlProvider::new(None));
        assert!(!provider.can_handle("https://www.danbolig.dk/bolig/1"));
    }
}
