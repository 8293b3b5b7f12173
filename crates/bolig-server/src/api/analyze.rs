//! The two analysis endpoints: submit a listing URL, poll its status.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bolig_core::AnalysisStatus;

use crate::analysis::{StatusError, SubmitError};
use crate::middleware::RequestId;

use super::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct AnalyzeRequest {
    url: String,
}

#[derive(Debug, Serialize)]
pub(super) struct AnalyzeSubmitResponse {
    listing_id: Uuid,
    status: AnalysisStatus,
    message: String,
}

#[derive(Debug, Serialize)]
pub(super) struct AnalysisStatusResponse {
    listing_id: Uuid,
    status: AnalysisStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    url: String,
}

/// `POST /api/v1/analyze`: accept a URL and schedule the analysis.
///
/// Replies 202 immediately; all downstream progress and failure is
/// observable only via the status endpoint.
pub(super) async fn submit_analysis(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<(StatusCode, Json<AnalyzeSubmitResponse>), ApiError> {
    let outcome = state.service.submit(&request.url).await.map_err(|error| {
        match error {
            SubmitError::Validation(validation) => {
                tracing::warn!(
                    request_id = %req_id.0,
                    url = %request.url,
                    error = %validation,
                    "submission rejected"
                );
                ApiError::new("validation_error", validation.to_string())
            }
            SubmitError::Db(db) => {
                tracing::error!(
                    request_id = %req_id.0,
                    url = %request.url,
                    error = %db,
                    "submission failed"
                );
                ApiError::new("internal_error", "Analysen kunne ikke startes. Prøv igen senere.")
            }
        }
    })?;

    Ok((
        StatusCode::ACCEPTED,
        Json(AnalyzeSubmitResponse {
            listing_id: outcome.listing_id,
            status: outcome.status,
            message: "Analysen er modtaget og behandles i baggrunden.".to_owned(),
        }),
    ))
}

/// `GET /api/v1/analyze/{listing_id}`: current status plus whichever of
/// result/error is populated.
pub(super) async fn get_analysis_status(
    State(state): State<AppState>,
    Path(listing_id): Path<Uuid>,
) -> Result<Json<AnalysisStatusResponse>, ApiError> {
    let view = state
        .service
        .get_status(listing_id)
        .await
        .map_err(|error| match error {
            StatusError::NotFound(id) => {
                ApiError::new("not_found", format!("Listing {id} blev ikke fundet"))
            }
            StatusError::Db(db) => {
                tracing::error!(%listing_id, error = %db, "status lookup failed");
                ApiError::new("internal_error", "Status kunne ikke hentes. Prøv igen senere.")
            }
        })?;

    let listing = view.listing;
    Ok(Json(AnalysisStatusResponse {
        listing_id: listing.id,
        status: view.status,
        result: listing.analysis_result,
        error: listing.error_message,
        created_at: listing.created_at,
        updated_at: listing.updated_at,
        url: listing.url,
    }))
}
