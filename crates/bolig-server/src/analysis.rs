//! The analysis orchestrator.
//!
//! `submit` is the synchronous half: validate, dedup against the
//! normalized URL, persist, and schedule the background task. The task
//! itself walks the listing through the status machine (fetch, parse,
//! optional secondary enrichment, AI analysis) with one top-level error
//! boundary that writes exactly one terminal status on every exit path.

use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use bolig_ai::{combine_texts, AiAnalyzer, AiError};
use bolig_core::AnalysisStatus;
use bolig_db::{DbError, ListingRow};
use bolig_scraper::{
    fetch_html, urlutil, validate_listing_url, FetchError, ProviderError, ProviderRegistry,
    ValidationError,
};

/// Errors surfaced synchronously to the submitter.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// Carries the Danish user-facing message.
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Db(#[from] DbError),
}

/// Errors raised while reading a listing's status.
#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    #[error("listing {0} not found")]
    NotFound(Uuid),
    #[error(transparent)]
    Db(#[from] DbError),
}

/// Failure inside the background pipeline, classified into the terminal
/// status it maps to.
#[derive(Debug, thiserror::Error)]
enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("no content could be extracted from the listing")]
    EmptyContent,
    #[error(transparent)]
    Ai(#[from] AiError),
    #[error(transparent)]
    Db(#[from] DbError),
}

impl PipelineError {
    fn status(&self) -> AnalysisStatus {
        match self {
            Self::Fetch(error) if error.is_timeout() => AnalysisStatus::Timeout,
            Self::Ai(AiError::Http(error)) if error.is_timeout() => AnalysisStatus::Timeout,
            Self::Provider(_) => AnalysisStatus::InvalidUrl,
            Self::Fetch(_) | Self::EmptyContent | Self::Ai(_) | Self::Db(_) => {
                AnalysisStatus::Error
            }
        }
    }
}

/// What `submit` hands back to the HTTP layer.
#[derive(Debug, Clone, Copy)]
pub struct SubmitOutcome {
    pub listing_id: Uuid,
    pub status: AnalysisStatus,
}

/// Current state of a listing, for the status endpoint.
#[derive(Debug, Clone)]
pub struct StatusView {
    pub listing: ListingRow,
    pub status: AnalysisStatus,
}

pub struct AnalysisService {
    pool: PgPool,
    registry: ProviderRegistry,
    analyzer: AiAnalyzer,
    http: reqwest::Client,
    fetch_timeout_secs: u64,
    user_agent: String,
}

impl AnalysisService {
    #[must_use]
    pub fn new(
        pool: PgPool,
        registry: ProviderRegistry,
        analyzer: AiAnalyzer,
        http: reqwest::Client,
        fetch_timeout_secs: u64,
        user_agent: String,
    ) -> Self {
        Self {
            pool,
            registry,
            analyzer,
            http,
            fetch_timeout_secs,
            user_agent,
        }
    }

    /// Validates and registers a submission, scheduling the background task
    /// when the listing needs (re-)analysis. Returns immediately; progress
    /// is observable only through the status endpoint.
    ///
    /// Dedup rules on an existing row for the same normalized URL:
    /// terminal-error rows are re-queued and re-run, completed rows are
    /// returned as-is, and in-flight rows are returned as-is so no second
    /// task ever works the same listing.
    ///
    /// # Errors
    ///
    /// [`SubmitError::Validation`] for rejected URLs (message is
    /// user-facing Danish), [`SubmitError::Db`] on persistence failures.
    pub async fn submit(self: &Arc<Self>, url: &str) -> Result<SubmitOutcome, SubmitError> {
        validate_listing_url(url)?;
        let normalized_url =
            urlutil::normalize_url(url).ok_or(ValidationError::InvalidUrl)?;

        if let Some(row) = bolig_db::find_by_normalized_url(&self.pool, &normalized_url).await? {
            return self.resubmit_existing(row).await;
        }

        let (row, created) =
            bolig_db::get_or_create_listing(&self.pool, url, &normalized_url).await?;
        if created {
            tracing::info!(listing_id = %row.id, url, "created listing; scheduling analysis");
            self.spawn_analysis(row.id);
            return Ok(SubmitOutcome {
                listing_id: row.id,
                status: AnalysisStatus::Pending,
            });
        }
        // Lost the insert race: another submission owns the task.
        self.resubmit_existing(row).await
    }

    async fn resubmit_existing(
        self: &Arc<Self>,
        row: ListingRow,
    ) -> Result<SubmitOutcome, SubmitError> {
        let status = parse_status(&row);

        if status.is_terminal_error() {
            tracing::info!(listing_id = %row.id, previous = %status, "re-queueing failed listing");
            bolig_db::requeue_listing(&self.pool, row.id).await?;
            self.spawn_analysis(row.id);
            return Ok(SubmitOutcome {
                listing_id: row.id,
                status: AnalysisStatus::Queued,
            });
        }

        tracing::info!(listing_id = %row.id, status = %status, "listing already known; not re-queueing");
        Ok(SubmitOutcome {
            listing_id: row.id,
            status,
        })
    }

    /// Reads the current status plus whichever of result/error is set.
    ///
    /// # Errors
    ///
    /// [`StatusError::NotFound`] for unknown ids, [`StatusError::Db`] on
    /// persistence failures.
    pub async fn get_status(&self, listing_id: Uuid) -> Result<StatusView, StatusError> {
        let listing = bolig_db::get_listing(&self.pool, listing_id)
            .await?
            .ok_or(StatusError::NotFound(listing_id))?;
        let status = parse_status(&listing);
        Ok(StatusView { listing, status })
    }

    fn spawn_analysis(self: &Arc<Self>, listing_id: Uuid) {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            service.run_analysis(listing_id).await;
        });
    }

    /// The background task: loads the listing and drives the pipeline,
    /// catching every failure at this single boundary. Nothing propagates
    /// out; the task's last act is always exactly one status write.
    pub async fn run_analysis(&self, listing_id: Uuid) {
        let listing = match bolig_db::get_listing(&self.pool, listing_id).await {
            Ok(Some(listing)) => listing,
            Ok(None) => {
                tracing::error!(%listing_id, "listing not found; aborting analysis task");
                return;
            }
            Err(error) => {
                tracing::error!(%listing_id, error = %error, "failed to load listing");
                return;
            }
        };

        if let Err(error) = self.run_pipeline(&listing).await {
            let status = error.status();
            tracing::error!(
                %listing_id,
                terminal_status = %status,
                error = %error,
                "analysis task failed"
            );
            if let Err(db_error) =
                bolig_db::set_error(&self.pool, listing_id, status, &error.to_string()).await
            {
                tracing::error!(%listing_id, error = %db_error, "failed to persist error status");
            }
        }
    }

    async fn run_pipeline(&self, listing: &ListingRow) -> Result<(), PipelineError> {
        let listing_id = listing.id;

        bolig_db::update_status(&self.pool, listing_id, AnalysisStatus::FetchingHtml).await?;
        let html = fetch_html(
            &self.http,
            &listing.url,
            self.fetch_timeout_secs,
            &self.user_agent,
        )
        .await?;

        bolig_db::update_status(&self.pool, listing_id, AnalysisStatus::ParsingData).await?;
        let provider = self
            .registry
            .get_provider_for_content(&listing.url, Some(&html))?;
        tracing::info!(%listing_id, provider = provider.name(), "parsing primary content");
        let primary = provider.parse(&listing.url, &html).await;

        // Secondary (redirect) content is optional enrichment: every
        // failure on this path is logged and swallowed.
        let url_redirect = primary
            .original_link
            .as_deref()
            .filter(|link| *link != listing.url)
            .map(ToOwned::to_owned);
        let mut secondary_text: Option<String> = None;
        if let Some(redirect) = &url_redirect {
            bolig_db::update_status(&self.pool, listing_id, AnalysisStatus::PreparingAnalysis)
                .await?;
            secondary_text = self.fetch_secondary(redirect).await;
        }

        bolig_db::save_extraction(
            &self.pool,
            listing_id,
            url_redirect.as_deref(),
            primary.property_image_url.as_deref(),
            primary.extracted_text.as_deref(),
            secondary_text.as_deref(),
        )
        .await?;

        bolig_db::update_status(&self.pool, listing_id, AnalysisStatus::GeneratingInsights)
            .await?;
        let combined = combine_texts(
            primary.extracted_text.as_deref().unwrap_or(""),
            secondary_text.as_deref(),
        );
        if combined.trim().is_empty() {
            return Err(PipelineError::EmptyContent);
        }

        let result = self.analyzer.analyze_text(&combined).await?;

        bolig_db::update_status(&self.pool, listing_id, AnalysisStatus::Finalizing).await?;
        bolig_db::save_analysis_result(&self.pool, listing_id, &result).await?;
        tracing::info!(%listing_id, "analysis completed");
        Ok(())
    }

    /// Fetches and parses the redirect-resolved realtor page. Always
    /// non-fatal: any failure is reported as "no secondary content".
    async fn fetch_secondary(&self, url: &str) -> Option<String> {
        let html = match fetch_html(&self.http, url, self.fetch_timeout_secs, &self.user_agent)
            .await
        {
            Ok(html) => html,
            Err(error) => {
                tracing::warn!(url, error = %error, "secondary fetch failed; continuing without it");
                return None;
            }
        };

        let provider = match self.registry.get_provider_for_content(url, Some(&html)) {
            Ok(provider) => provider,
            Err(error) => {
                tracing::warn!(url, error = %error, "no provider for secondary content");
                return None;
            }
        };

        let parsed = provider.parse(url, &html).await;
        parsed
            .extracted_text
            .filter(|text| !text.trim().is_empty())
    }
}

fn parse_status(row: &ListingRow) -> AnalysisStatus {
    row.status.parse().unwrap_or_else(|error| {
        tracing::error!(listing_id = %row.id, %error, "unknown status in database; treating as error");
        AnalysisStatus::Error
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetch_timeout() -> PipelineError {
        PipelineError::Fetch(FetchError::Timeout {
            url: "https://home.dk/bolig/1".to_owned(),
        })
    }

    #[test]
    fn timeouts_map_to_timeout_status() {
        assert_eq!(fetch_timeout().status(), AnalysisStatus::Timeout);
    }

    #[test]
    fn missing_provider_maps_to_invalid_url() {
        let error = PipelineError::Provider(ProviderError::NoProvider {
            url: "https://example.com".to_owned(),
        });
        assert_eq!(error.status(), AnalysisStatus::InvalidUrl);
    }

    #[test]
    fn fetch_status_errors_map_to_generic_error() {
        let error = PipelineError::Fetch(FetchError::UnexpectedStatus {
            status: 503,
            url: "https://home.dk/bolig/1".to_owned(),
        });
        assert_eq!(error.status(), AnalysisStatus::Error);
    }

    #[test]
    fn ai_and_content_errors_map_to_generic_error() {
        assert_eq!(
            PipelineError::Ai(AiError::NoFinalText).status(),
            AnalysisStatus::Error
        );
        assert_eq!(PipelineError::EmptyContent.status(), AnalysisStatus::Error);
    }
}
