//! Generic HTML content extraction.
//!
//! Turns a listing page into one whitespace-normalized text blob for the
//! analyzer, and hunts for the best candidate property image. Both
//! functions swallow malformed markup instead of erroring: a broken page
//! yields an empty result, not a failed pipeline.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::urlutil::resolve_url;

/// Elements whose text never describes the property. `nav` and `footer` are
/// kept: portal navigation often carries the realtor name and office city.
const TEXT_IGNORE_TAGS: [&str; 5] = ["script", "style", "noscript", "iframe", "header"];

/// Substrings that disqualify an `<img>` candidate (chrome, not content).
const IMAGE_DENYLIST: [&str; 8] = [
    ".svg",
    "base64,",
    "logo",
    "icon",
    "avatar",
    "spinner",
    "loading",
    "placeholder",
];

static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("valid selector"));
static META_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta").expect("valid selector"));
static BODY_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body").expect("valid selector"));
static IMG_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img").expect("valid selector"));

/// Extracts readable text from a listing page.
///
/// The page title and `<meta name="description">` content are prepended to
/// the body text. Script, style, noscript, iframe, and header subtrees are
/// skipped, as are HTML comments. All whitespace runs collapse to single
/// spaces and the result is trimmed; empty or unparseable input yields an
/// empty string.
#[must_use]
pub fn extract_text(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }

    let document = Html::parse_document(html);

    let title = document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|el| el.text().collect::<String>())
        .unwrap_or_default();

    let meta_description = document
        .select(&META_SELECTOR)
        .find(|el| {
            el.value()
                .attr("name")
                .is_some_and(|name| name.eq_ignore_ascii_case("description"))
        })
        .and_then(|el| el.value().attr("content"))
        .unwrap_or_default()
        .to_owned();

    let scope = document
        .select(&BODY_SELECTOR)
        .next()
        .unwrap_or_else(|| document.root_element());
    let body_text = collect_visible_text(scope);

    let combined = [title.trim(), meta_description.trim(), body_text.trim()]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");

    collapse_whitespace(&combined)
}

/// Gathers the text nodes under `scope`, skipping ignored subtrees.
///
/// Comments are not text nodes and fall away on their own.
fn collect_visible_text(scope: ElementRef<'_>) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for node in scope.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let trimmed = text.trim();
        if trimmed.is_empty() {
            continue;
        }
        let ignored = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| TEXT_IGNORE_TAGS.contains(&el.name()))
        });
        if !ignored {
            parts.push(trimmed);
        }
    }
    parts.join(" ")
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Finds the most likely property image URL in a page.
///
/// Priority: `og:image` meta (returned immediately, resolved against
/// `base_url`), then `twitter:image` / `twitter:image:src` meta, then the
/// first `<img src>` that resolves to an absolute http(s) URL and does not
/// hit the denylist. Returns `None` when nothing qualifies.
#[must_use]
pub fn extract_image(html: &str, base_url: &str) -> Option<String> {
    if html.is_empty() {
        return None;
    }

    let document = Html::parse_document(html);

    // og:image is the portals' own pick for the hero image; trust it even if
    // the URL fails to resolve (matching the immediate-return contract).
    for meta in document.select(&META_SELECTOR) {
        let Some(property) = meta.value().attr("property") else {
            continue;
        };
        if property.eq_ignore_ascii_case("og:image") {
            if let Some(content) = meta.value().attr("content").filter(|c| !c.is_empty()) {
                tracing::debug!("found image URL in og:image meta tag");
                return resolve_url(base_url, content);
            }
        }
    }

    for meta in document.select(&META_SELECTOR) {
        let Some(name) = meta.value().attr("name") else {
            continue;
        };
        let name = name.to_lowercase();
        if name == "twitter:image" || name == "twitter:image:src" {
            if let Some(content) = meta.value().attr("content").filter(|c| !c.is_empty()) {
                tracing::debug!("found image URL in twitter:image meta tag");
                return resolve_url(base_url, content);
            }
        }
    }

    for img in document.select(&IMG_SELECTOR) {
        let Some(src) = img.value().attr("src") else {
            continue;
        };
        let Some(resolved) = resolve_url(base_url, src) else {
            continue;
        };
        let lowered = resolved.to_lowercase();
        if resolved.starts_with("http") && !IMAGE_DENYLIST.iter().any(|deny| lowered.contains(deny))
        {
            tracing::debug!(url = %resolved, "found candidate image URL in img tag");
            return Some(resolved);
        }
    }

    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
