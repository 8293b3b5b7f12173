pub mod fetch;
pub mod firecrawl;
pub mod html;
pub mod providers;
pub mod urlutil;
pub mod validate;

pub use fetch::{build_http_client, fetch_html, FetchError};
pub use firecrawl::{FirecrawlClient, FirecrawlError, ScrapeData};
pub use providers::{ParseResult, Provider, ProviderError, ProviderRegistry};
pub use validate::{validate_listing_url, ValidationError, SUPPORTED_DOMAINS};
