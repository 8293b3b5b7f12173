//! Database operations for the `listings` table.
//!
//! One row per submitted listing URL, keyed for dedup by `normalized_url`.
//! The background analysis task owns all mutations after creation; every
//! writer refreshes `updated_at`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// Error messages are capped before persisting so a dumped HTML body or a
/// long provider trace cannot bloat the row.
const MAX_ERROR_MESSAGE_CHARS: usize = 1000;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `listings` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ListingRow {
    pub id: Uuid,
    pub url: String,
    pub normalized_url: String,
    pub status: String,
    pub url_redirect: Option<String>,
    pub property_image_url: Option<String>,
    pub text_extracted: Option<String>,
    pub text_extracted_redirect: Option<String>,
    pub analysis_result: Option<serde_json::Value>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns a single listing by id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_listing(pool: &PgPool, id: Uuid) -> Result<Option<ListingRow>, DbError> {
    let row = sqlx::query_as::<_, ListingRow>(
        "SELECT id, url, normalized_url, status, url_redirect, property_image_url, \
                text_extracted, text_extracted_redirect, analysis_result, error_message, \
                created_at, updated_at \
         FROM listings \
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns a single listing by its normalized URL, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_by_normalized_url(
    pool: &PgPool,
    normalized_url: &str,
) -> Result<Option<ListingRow>, DbError> {
    let row = sqlx::query_as::<_, ListingRow>(
        "SELECT id, url, normalized_url, status, url_redirect, property_image_url, \
                text_extracted, text_extracted_redirect, analysis_result, error_message, \
                created_at, updated_at \
         FROM listings \
         WHERE normalized_url = $1",
    )
    .bind(normalized_url)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Creates a new listing row in status `pending` and returns it.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails (including a unique
/// constraint violation on `normalized_url`).
pub async fn create_listing(
    pool: &PgPool,
    url: &str,
    normalized_url: &str,
) -> Result<ListingRow, DbError> {
    let row = sqlx::query_as::<_, ListingRow>(
        "INSERT INTO listings (url, normalized_url, status) \
         VALUES ($1, $2, 'pending') \
         RETURNING id, url, normalized_url, status, url_redirect, property_image_url, \
                   text_extracted, text_extracted_redirect, analysis_result, error_message, \
                   created_at, updated_at",
    )
    .bind(url)
    .bind(normalized_url)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Fetches the listing for `normalized_url`, creating it in status `pending`
/// if no row exists yet. The boolean is `true` when this call inserted the
/// row; only the inserting submission schedules the background task.
///
/// Concurrent submissions of the same normalized URL converge on one row:
/// the insert is `ON CONFLICT DO NOTHING`, so whichever submission loses the
/// race falls through to the fetch and sees the winner's row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if a query fails, or [`DbError::NotFound`] if
/// the row vanished between insert and fetch (concurrent delete).
pub async fn get_or_create_listing(
    pool: &PgPool,
    url: &str,
    normalized_url: &str,
) -> Result<(ListingRow, bool), DbError> {
    let inserted = sqlx::query_as::<_, ListingRow>(
        "INSERT INTO listings (url, normalized_url, status) \
         VALUES ($1, $2, 'pending') \
         ON CONFLICT (normalized_url) DO NOTHING \
         RETURNING id, url, normalized_url, status, url_redirect, property_image_url, \
                   text_extracted, text_extracted_redirect, analysis_result, error_message, \
                   created_at, updated_at",
    )
    .bind(url)
    .bind(normalized_url)
    .fetch_optional(pool)
    .await?;

    if let Some(row) = inserted {
        return Ok((row, true));
    }

    let row = find_by_normalized_url(pool, normalized_url)
        .await?
        .ok_or(DbError::NotFound)?;
    Ok((row, false))
}

/// Updates the status of a listing and refreshes `updated_at`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn update_status(
    pool: &PgPool,
    id: Uuid,
    status: bolig_core::AnalysisStatus,
) -> Result<(), DbError> {
    sqlx::query(
        "UPDATE listings \
         SET status = $1, updated_at = NOW() \
         WHERE id = $2",
    )
    .bind(status.as_str())
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Writes a terminal error status plus a truncated error message.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn set_error(
    pool: &PgPool,
    id: Uuid,
    status: bolig_core::AnalysisStatus,
    message: &str,
) -> Result<(), DbError> {
    let truncated = truncate_message(message);
    sqlx::query(
        "UPDATE listings \
         SET status = $1, error_message = $2, updated_at = NOW() \
         WHERE id = $3",
    )
    .bind(status.as_str())
    .bind(truncated)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Persists everything the extraction phase discovered about a listing.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn save_extraction(
    pool: &PgPool,
    id: Uuid,
    url_redirect: Option<&str>,
    property_image_url: Option<&str>,
    text_extracted: Option<&str>,
    text_extracted_redirect: Option<&str>,
) -> Result<(), DbError> {
    sqlx::query(
        "UPDATE listings \
         SET url_redirect = $1, property_image_url = $2, text_extracted = $3, \
             text_extracted_redirect = $4, updated_at = NOW() \
         WHERE id = $5",
    )
    .bind(url_redirect)
    .bind(property_image_url)
    .bind(text_extracted)
    .bind(text_extracted_redirect)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Saves the structured analysis result and marks the listing `completed`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn save_analysis_result(
    pool: &PgPool,
    id: Uuid,
    result: &serde_json::Value,
) -> Result<(), DbError> {
    sqlx::query(
        "UPDATE listings \
         SET analysis_result = $1, status = 'completed', error_message = NULL, \
             updated_at = NOW() \
         WHERE id = $2",
    )
    .bind(result)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Resets a listing in a terminal error state back to `queued` so a
/// re-submission can run the pipeline again.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn requeue_listing(pool: &PgPool, id: Uuid) -> Result<(), DbError> {
    sqlx::query(
        "UPDATE listings \
         SET status = 'queued', error_message = NULL, updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

fn truncate_message(message: &str) -> String {
    message.chars().take(MAX_ERROR_MESSAGE_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_messages_pass_through() {
        assert_eq!(truncate_message("connection refused"), "connection refused");
    }

    #[test]
    fn long_messages_are_capped() {
        let long = "x".repeat(5000);
        let truncated = truncate_message(&long);
        assert_eq!(truncated.chars().count(), MAX_ERROR_MESSAGE_CHARS);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        // Multi-byte Danish characters must not be split mid-codepoint.
        let long = "ø".repeat(2000);
        let truncated = truncate_message(&long);
        assert_eq!(truncated.chars().count(), MAX_ERROR_MESSAGE_CHARS);
        assert!(truncated.chars().all(|c| c == 'ø'));
    }
}
