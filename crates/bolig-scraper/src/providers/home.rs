//! Provider for Home.dk realtor pages.
//!
//! Home links point straight at the realtor's listing, so no redirect
//! resolution is needed, only an image cascade tuned to Home's markup.

use std::sync::LazyLock;

use scraper::{Html, Selector};

use super::ParseResult;
use crate::html;
use crate::urlutil::extract_site_domain;

/// Containers Home.dk renders the hero gallery into.
static GALLERY_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".property-details-main__header img, .image-gallery-preview img")
        .expect("valid selector")
});
static OG_IMAGE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[property="og:image"]"#).expect("valid selector"));

pub struct HomeProvider;

impl HomeProvider {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    #[must_use]
    pub fn can_handle(&self, url: &str) -> bool {
        extract_site_domain(url).is_some_and(|domain| domain == "home.dk")
    }

    /// Image cascade: og:image meta, then Home's gallery selectors, then
    /// the generic heuristics.
    #[must_use]
    pub fn extract_image(&self, html_content: &str, base_url: &str) -> Option<String> {
        if html_content.is_empty() {
            return None;
        }

        let document = Html::parse_document(html_content);

        if let Some(content) = document
            .select(&OG_IMAGE_SELECTOR)
            .next()
            .and_then(|el| el.value().attr("content"))
            .filter(|c| !c.is_empty())
        {
            return Some(content.to_owned());
        }

        for img in document.select(&GALLERY_SELECTOR) {
            if let Some(src) = img.value().attr("src") {
                if src.starts_with("http") {
                    tracing::debug!(src, "found image in Home.dk gallery selector");
                    return Some(src.to_owned());
                }
            }
        }

        html::extract_image(html_content, base_url)
    }

    #[must_use]
    pub fn parse(&self, url: &str, html_content: &str) -> ParseResult {
        ParseResult {
            // Direct realtor link: the original link is the URL itself.
            original_link: Some(url.to_owned()),
            extracted_text: Some(html::extract_text(html_content)),
            property_image_url: self.extract_image(html_content, url),
        }
    }
}

impl Default for HomeProvider {
    fn default() -> Self {
        Self::new()
    }
}
