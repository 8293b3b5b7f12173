//! Submission-time validation of listing URLs.
//!
//! Rejections carry the Danish message shown to the submitter. Validation
//! runs synchronously before anything is persisted; a rejected URL never
//! enters the background pipeline.

use url::Url;

use crate::urlutil::extract_site_domain;

/// Portals the service accepts listings from.
pub const SUPPORTED_DOMAINS: &[&str] = &[
    // Major aggregators
    "boligsiden.dk",
    // Major real estate chains
    "home.dk",
    "nybolig.dk",
    "edc.dk",
    "danbolig.dk",
    "estate.dk",
    "realmaeglerne.dk",
    // Rental properties
    "lejebolig.dk",
    "boligportal.dk",
    // Other real estate agencies
    "lokalbolig.dk",
    "boligone.dk",
    "1848.dk",
    "dinmaegler.dk",
    "lilholts.dk",
    "coldwellbanker.dk",
];

/// A rejected listing URL; `Display` is the user-facing Danish message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Link er ikke angivet")]
    MissingUrl,
    #[error("Linket er ugyldigt")]
    InvalidUrl,
    #[error("Linket ser ud til at være en bolig der ikke er til salg.")]
    NotForSale,
    #[error("Linket skal indeholde en udbuds-ID (udbud=...)")]
    MissingUdbudId,
    #[error(
        "Linket skal være fra en understøttet boligportal. \
         Se listen over understøttede portaler på forsiden."
    )]
    UnsupportedPortal,
}

/// Validates that a URL points at a supported portal and a listing that is
/// still for sale.
///
/// `boligsiden.dk` links get the stricter aggregator check: they must carry
/// a non-empty `udbud` query parameter, since that is the only way to reach
/// the underlying realtor listing later.
///
/// # Errors
///
/// Returns the [`ValidationError`] whose message should be shown to the
/// submitter.
pub fn validate_listing_url(url: &str) -> Result<(), ValidationError> {
    if url.is_empty() {
        return Err(ValidationError::MissingUrl);
    }

    let parsed = Url::parse(url).map_err(|_| ValidationError::InvalidUrl)?;
    let domain = extract_site_domain(url).ok_or(ValidationError::InvalidUrl)?;

    // "ViewPage" paths are the portals' signal for a delisted property.
    if parsed.path().to_lowercase().contains("viewpage") {
        return Err(ValidationError::NotForSale);
    }

    if domain == "boligsiden.dk" {
        return validate_boligsiden_url(&parsed);
    }

    if !SUPPORTED_DOMAINS.contains(&domain.as_str()) {
        return Err(ValidationError::UnsupportedPortal);
    }

    Ok(())
}

fn validate_boligsiden_url(parsed: &Url) -> Result<(), ValidationError> {
    let has_udbud = parsed
        .query_pairs()
        .any(|(key, value)| key == "udbud" && !value.is_empty());
    if !has_udbud {
        return Err(ValidationError::MissingUdbudId);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_supported_realtor_domain() {
        assert_eq!(validate_listing_url("https://home.dk/bolig/42"), Ok(()));
        assert_eq!(
            validate_listing_url("https://www.edc.dk/bolig/byvej-1"),
            Ok(())
        );
    }

    #[test]
    fn rejects_empty_url() {
        assert_eq!(
            validate_listing_url(""),
            Err(ValidationError::MissingUrl)
        );
    }

    #[test]
    fn rejects_garbage_url() {
        assert_eq!(
            validate_listing_url("not a url"),
            Err(ValidationError::InvalidUrl)
        );
    }

    #[test]
    fn rejects_unsupported_portal() {
        assert_eq!(
            validate_listing_url("https://example.com/house"),
            Err(ValidationError::UnsupportedPortal)
        );
    }

    #[test]
    fn rejects_viewpage_paths_case_insensitively() {
        assert_eq!(
            validate_listing_url("https://home.dk/ViewPage/123"),
            Err(ValidationError::NotForSale)
        );
        assert_eq!(
            validate_listing_url("https://home.dk/sales/viewpage?id=1"),
            Err(ValidationError::NotForSale)
        );
    }

    #[test]
    fn boligsiden_requires_udbud_parameter() {
        assert_eq!(
            validate_listing_url("https://www.boligsiden.dk/adresse/byvej-1"),
            Err(ValidationError::MissingUdbudId)
        );
    }

    #[test]
    fn boligsiden_rejects_empty_udbud_value() {
        assert_eq!(
            validate_listing_url("https://boligsiden.dk/bolig?udbud="),
            Err(ValidationError::MissingUdbudId)
        );
    }

    #[test]
    fn boligsiden_accepts_udbud_id() {
        assert_eq!(
            validate_listing_url("https://www.boligsiden.dk/adresse/byvej-1?udbud=abc-123"),
            Ok(())
        );
    }

    #[test]
    fn danish_messages_are_exact() {
        assert_eq!(
            ValidationError::MissingUdbudId.to_string(),
            "Linket skal indeholde en udbuds-ID (udbud=...)"
        );
        assert_eq!(
            ValidationError::NotForSale.to_string(),
            "Linket ser ud til at være en bolig der ikke er til salg."
        );
    }
}
