//! Listing analysis lifecycle states.
//!
//! The background task walks a listing through the in-progress states in
//! order; every exit path ends in exactly one terminal state.

use serde::{Deserialize, Serialize};

/// Status of a listing analysis, persisted as its snake_case string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    Pending,
    Queued,
    FetchingHtml,
    ParsingData,
    PreparingAnalysis,
    GeneratingInsights,
    Finalizing,
    Completed,
    Error,
    InvalidUrl,
    Timeout,
    Cancelled,
}

impl AnalysisStatus {
    /// The snake_case string stored in the database and returned by the API.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Queued => "queued",
            Self::FetchingHtml => "fetching_html",
            Self::ParsingData => "parsing_data",
            Self::PreparingAnalysis => "preparing_analysis",
            Self::GeneratingInsights => "generating_insights",
            Self::Finalizing => "finalizing",
            Self::Completed => "completed",
            Self::Error => "error",
            Self::InvalidUrl => "invalid_url",
            Self::Timeout => "timeout",
            Self::Cancelled => "cancelled",
        }
    }

    /// `true` once the analysis can make no further progress.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed) || self.is_terminal_error()
    }

    /// Terminal states that represent a failed analysis. A re-submission of
    /// the same URL re-queues a listing in one of these states.
    #[must_use]
    pub const fn is_terminal_error(self) -> bool {
        matches!(
            self,
            Self::Error | Self::InvalidUrl | Self::Timeout | Self::Cancelled
        )
    }

    /// `true` while the background task owns the listing. A listing in one
    /// of these states is never re-queued by a duplicate submission.
    #[must_use]
    pub const fn is_in_progress(self) -> bool {
        matches!(
            self,
            Self::Pending
                | Self::Queued
                | Self::FetchingHtml
                | Self::ParsingData
                | Self::PreparingAnalysis
                | Self::GeneratingInsights
                | Self::Finalizing
        )
    }
}

impl std::fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AnalysisStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "queued" => Ok(Self::Queued),
            "fetching_html" => Ok(Self::FetchingHtml),
            "parsing_data" => Ok(Self::ParsingData),
            "preparing_analysis" => Ok(Self::PreparingAnalysis),
            "generating_insights" => Ok(Self::GeneratingInsights),
            "finalizing" => Ok(Self::Finalizing),
            "completed" => Ok(Self::Completed),
            "error" => Ok(Self::Error),
            "invalid_url" => Ok(Self::InvalidUrl),
            "timeout" => Ok(Self::Timeout),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(UnknownStatus(other.to_owned())),
        }
    }
}

/// A status string in the database that no enum variant matches.
#[derive(Debug, thiserror::Error)]
#[error("unknown analysis status: {0}")]
pub struct UnknownStatus(pub String);
