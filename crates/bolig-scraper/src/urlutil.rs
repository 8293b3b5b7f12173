//! URL helpers for listing dedup and provider matching.
//!
//! Normalization produces the dedup key stored on every listing; domain
//! extraction feeds validation and provider `can_handle` checks. All
//! functions are pure and return `None` instead of erroring on garbage.

use url::Url;

/// Canonicalizes a URL into the form used as a dedup key.
///
/// Lowercases scheme, host, and path; strips query and fragment; keeps any
/// explicit port. Returns `None` when the input does not parse as a URL with
/// both a scheme and a host. Applying the function twice is a no-op.
#[must_use]
pub fn normalize_url(url: &str) -> Option<String> {
    if url.is_empty() {
        return None;
    }
    let parsed = Url::parse(url).ok()?;
    parsed.host_str()?;

    let scheme = parsed.scheme().to_lowercase();
    let host = parsed.host_str()?.to_lowercase();
    let path = parsed.path().to_lowercase();

    let authority = match parsed.port() {
        Some(port) => format!("{host}:{port}"),
        None => host,
    };

    Some(format!("{scheme}://{authority}{path}"))
}

/// Returns the lowercased hostname of a URL, `www.` prefix kept.
///
/// Use [`extract_site_domain`] when matching against portal names.
#[must_use]
pub fn extract_domain(url: &str) -> Option<String> {
    if url.is_empty() {
        return None;
    }
    let parsed = Url::parse(url).ok()?;
    parsed.host_str().map(str::to_lowercase)
}

/// Returns the lowercased hostname with a single leading `www.` stripped.
///
/// This is the form the domain whitelist and the provider domain checks
/// compare against, so `www.home.dk` and `home.dk` match the same portal.
/// A hostname that is nothing but `www.` yields `None`.
#[must_use]
pub fn extract_site_domain(url: &str) -> Option<String> {
    let host = extract_domain(url)?;
    match host.strip_prefix("www.") {
        Some("") => None,
        Some(stripped) => Some(stripped.to_owned()),
        None => Some(host),
    }
}

/// `true` iff the URL parses with both a scheme and a host.
#[must_use]
pub fn is_absolute_url(url: &str) -> bool {
    Url::parse(url).is_ok_and(|parsed| parsed.host_str().is_some())
}

/// Joins `relative` against `base`.
///
/// An empty `relative` returns `base` unchanged; an empty `base` returns
/// `relative` unchanged. Returns `None` when the join does not yield an
/// absolute URL.
#[must_use]
pub fn resolve_url(base: &str, relative: &str) -> Option<String> {
    if relative.is_empty() {
        if base.is_empty() {
            return None;
        }
        return Some(base.to_owned());
    }
    if base.is_empty() {
        return Some(relative.to_owned());
    }

    let base_url = Url::parse(base).ok()?;
    let resolved = base_url.join(relative).ok()?;
    if resolved.host_str().is_none() {
        tracing::warn!(base, relative, "URL resolution produced a non-absolute URL");
        return None;
    }
    Some(resolved.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // normalize_url
    // -----------------------------------------------------------------------

    #[test]
    fn normalize_lowercases_and_strips_query_fragment() {
        assert_eq!(
            normalize_url("HTTPS://Home.DK/Bolig/42?udbud=abc#gallery").as_deref(),
            Some("https://home.dk/bolig/42")
        );
    }

    #[test]
    fn normalize_keeps_explicit_port() {
        assert_eq!(
            normalize_url("http://home.dk:8080/bolig").as_deref(),
            Some("http://home.dk:8080/bolig")
        );
    }

    #[test]
    fn normalize_rejects_relative_and_garbage() {
        assert_eq!(normalize_url("/bolig/42"), None);
        assert_eq!(normalize_url("not a url"), None);
        assert_eq!(normalize_url(""), None);
    }

    #[test]
    fn normalize_is_idempotent() {
        let urls = [
            "HTTPS://WWW.Boligsiden.DK/Adresse/Byvej-1?udbud=xyz",
            "http://home.dk/Bolig/42/",
            "https://edc.dk",
        ];
        for url in urls {
            let once = normalize_url(url).unwrap();
            let twice = normalize_url(&once).unwrap();
            assert_eq!(once, twice, "normalizing twice must be a no-op for {url}");
        }
    }

    // -----------------------------------------------------------------------
    // extract_domain / extract_site_domain
    // -----------------------------------------------------------------------

    #[test]
    fn extract_domain_keeps_www() {
        assert_eq!(
            extract_domain("https://www.Home.dk/bolig").as_deref(),
            Some("www.home.dk")
        );
    }

    #[test]
    fn extract_site_domain_strips_www() {
        assert_eq!(
            extract_site_domain("https://www.home.dk/bolig").as_deref(),
            Some("home.dk")
        );
        assert_eq!(
            extract_site_domain("https://home.dk/bolig").as_deref(),
            Some("home.dk")
        );
    }

    #[test]
    fn extract_site_domain_rejects_bare_www() {
        assert_eq!(extract_site_domain("http://www./path"), None);
    }

    #[test]
    fn extract_domain_rejects_hostless() {
        assert_eq!(extract_domain("mailto:a@b.dk"), None);
        assert_eq!(extract_domain(""), None);
    }

    // -----------------------------------------------------------------------
    // is_absolute_url
    // -----------------------------------------------------------------------

    #[test]
    fn absolute_urls_are_recognised() {
        assert!(is_absolute_url("https://home.dk/bolig"));
        assert!(!is_absolute_url("/bolig/42"));
        assert!(!is_absolute_url(""));
    }

    // -----------------------------------------------------------------------
    // resolve_url
    // -----------------------------------------------------------------------

    #[test]
    fn resolves_relative_path_against_base() {
        assert_eq!(
            resolve_url("https://home.dk/bolig/42", "/images/a.jpg").as_deref(),
            Some("https://home.dk/images/a.jpg")
        );
    }

    #[test]
    fn absolute_relative_wins_over_base() {
        assert_eq!(
            resolve_url("https://home.dk/bolig", "https://cdn.home.dk/a.jpg").as_deref(),
            Some("https://cdn.home.dk/a.jpg")
        );
    }

    #[test]
    fn empty_relative_returns_base() {
        assert_eq!(
            resolve_url("https://home.dk/bolig", "").as_deref(),
            Some("https://home.dk/bolig")
        );
    }

    #[test]
    fn empty_base_returns_relative() {
        assert_eq!(resolve_url("", "/a.jpg").as_deref(), Some("/a.jpg"));
    }

    #[test]
    fn both_empty_is_none() {
        assert_eq!(resolve_url("", ""), None);
    }
}
