//! Generic provider for pages embedding schema.org JSON-LD.
//!
//! When a portal publishes structured data, a pretty-printed dump of it is
//! prepended to the plain page text: the structured fields (price, area,
//! energy label) are far more reliable analysis input than prose scraped
//! off the page.

use std::sync::LazyLock;

use scraper::{Html, Selector};

use super::ParseResult;
use crate::html;

static JSONLD_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"script[type="application/ld+json"]"#).expect("valid selector")
});

pub struct JsonLdProvider;

impl JsonLdProvider {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Claims any page with at least one JSON-LD script block.
    #[must_use]
    pub fn can_handle(&self, html_content: Option<&str>) -> bool {
        let Some(html_content) = html_content else {
            return false;
        };
        if html_content.is_empty() {
            return false;
        }
        let document = Html::parse_document(html_content);
        document.select(&JSONLD_SELECTOR).next().is_some()
    }

    /// Parses every JSON-LD block and flattens list/object shapes into one
    /// array. Blocks that fail to parse are logged and skipped.
    #[must_use]
    pub fn extract_json_ld(&self, html_content: &str) -> Vec<serde_json::Value> {
        let document = Html::parse_document(html_content);
        let mut items = Vec::new();
        for script in document.select(&JSONLD_SELECTOR) {
            let raw = script.text().collect::<String>();
            if raw.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<serde_json::Value>(&raw) {
                Ok(serde_json::Value::Array(list)) => items.extend(list),
                Ok(value) => items.push(value),
                Err(error) => {
                    tracing::warn!(error = %error, "failed to parse JSON-LD script block");
                }
            }
        }
        items
    }

    /// Image priority: JSON-LD `image` (string or first of array), then the
    /// nested `offers.itemOffered.image` shape, then the generic heuristics.
    #[must_use]
    pub fn extract_image(&self, html_content: &str, base_url: &str) -> Option<String> {
        if html_content.is_empty() {
            return None;
        }

        for item in self.extract_json_ld(html_content) {
            if let Some(url) = json_ld_image(&item) {
                tracing::debug!("found image URL in JSON-LD data");
                return Some(url);
            }
        }

        html::extract_image(html_content, base_url)
    }

    #[must_use]
    pub fn parse(&self, url: &str, html_content: &str) -> ParseResult {
        let property_image_url = self.extract_image(html_content, url);
        let extracted_text = html::extract_text(html_content);
        let items = self.extract_json_ld(html_content);

        let json_dump = serde_json::to_string_pretty(&items).unwrap_or_else(|_| "[]".to_owned());
        let combined =
            format!("JSON-LD Data:\n{json_dump}\n\nExtracted Page Text:\n{extracted_text}");

        ParseResult {
            // JSON-LD sites are usually the direct source.
            original_link: Some(url.to_owned()),
            extracted_text: Some(combined),
            property_image_url,
        }
    }
}

impl Default for JsonLdProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Pulls an absolute image URL out of one JSON-LD item.
fn json_ld_image(item: &serde_json::Value) -> Option<String> {
    let image = &item["image"];
    if let Some(url) = image.as_str().filter(|u| u.starts_with("http")) {
        return Some(url.to_owned());
    }
    if let Some(first) = image
        .as_array()
        .and_then(|list| list.first())
        .and_then(serde_json::Value::as_str)
        .filter(|u| u.starts_with("http"))
    {
        return Some(first.to_owned());
    }

    // Product/Offer schemas nest the image under the offered item.
    item["offers"]["itemOffered"]["image"]
        .as_str()
        .filter(|u| u.starts_with("http"))
        .map(ToOwned::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://www.estate.dk/bolig/1";

    #[test]
    fn claims_pages_with_jsonld_only() {
        let p = JsonLdProvider::new();
        let with = r#"<script type="application/ld+json">{"@type":"Product"}</script>"#;
        let without = "<html><body><script>var x = 1;</script></body></html>";
        assert!(p.can_handle(Some(with)));
        assert!(!p.can_handle(Some(without)));
        assert!(!p.can_handle(None));
    }

    #[test]
    fn flattens_arrays_and_objects_into_one_list() {
        let p = JsonLdProvider::new();
        let html = r#"
            <script type="application/ld+json">[{"@type":"Place"},{"@type":"Offer"}]</script>
            <script type="application/ld+json">{"@type":"Product"}</script>
        "#;
        let items = p.extract_json_ld(html);
        assert_eq!(items.len(), 3);
    }

    #[test]
    fn malformed_blocks_are_skipped() {
        let p = JsonLdProvider::new();
        let html = r#"
            <script type="application/ld+json">{not json</script>
            <script type="application/ld+json">{"@type":"Product"}</script>
        "#;
        assert_eq!(p.extract_json_ld(html).len(), 1);
    }

    #[test]
    fn jsonld_image_string_wins_over_meta_tags() {
        let p = JsonLdProvider::new();
        let html = r#"
            <meta property="og:image" content="https://cdn.estate.dk/meta.jpg">
            <script type="application/ld+json">{"image": "https://cdn.estate.dk/ld.jpg"}</script>
        "#;
        assert_eq!(
            p.extract_image(html, BASE).as_deref(),
            Some("https://cdn.estate.dk/ld.jpg")
        );
    }

    #[test]
    fn jsonld_image_array_uses_first_entry() {
        let p = JsonLdProvider::new();
        let html = r#"
            <script type="application/ld+json">
            {"image": ["https://cdn.estate.dk/a.jpg", "https://cdn.estate.dk/b.jpg"]}
            </script>
        "#;
        assert_eq!(
            p.extract_image(html, BASE).as_deref(),
            Some("https://cdn.estate.dk/a.jpg")
        );
    }

    #[test]
    fn nested_offer_image_is_found() {
        let p = JsonLdProvider::new();
        let html = r#"
            <script type="application/ld+json">
            {"offers": {"itemOffered": {"image": "https://cdn.estate.dk/offer.jpg"}}}
            </script>
        "#;
        assert_eq!(
            p.extract_image(html, BASE).as_deref(),
            Some("https://cdn.estate.dk/offer.jpg")
        );
    }

    #[test]
    fn falls_back_to_meta_when_jsonld_has_no_image() {
        let p = JsonLdProvider::new();
        let html = r#"
            <meta property="og:image" content="https://cdn.estate.dk/meta.jpg">
            <script type="application/ld+json">{"@type":"Product"}</script>
        "#;
        assert_eq!(
            p.extract_image(html, BASE).as_deref(),
            Some("https://cdn.estate.dk/meta.jpg")
        );
    }

    #[test]
    fn parse_combines_jsonld_dump_and_page_text() {
        let p = JsonLdProvider::new();
        let html = r#"
            <html><head>
            <script type="application/ld+json">{"@type":"Product","name":"Byvej 1"}</script>
            </head><body><p>Dejlig villa</p></body></html>
        "#;
        let result = p.parse(BASE, html);
        let text = result.extracted_text.unwrap();
        assert!(text.starts_with("JSON-LD Data:\n"));
        assert!(text.contains("\"name\": \"Byvej 1\""));
        assert!(text.contains("Extracted Page Text:\nDejlig villa"));
        assert_eq!(result.original_link.as_deref(), Some(BASE));
    }
}
