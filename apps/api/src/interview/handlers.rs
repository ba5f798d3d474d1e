//! Axum route handlers for interview preparation.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::errors::AppError;
use crate::interview::analysis::{analyze_job, prep_blurb, JobAnalysis, JobPostingRequest, PrepBlurb};
use crate::state::AppState;

/// POST /api/v1/users/:user_id/interview-prep
///
/// Analyzes a job posting against the user's achievements.
pub async fn handle_job_analysis(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<JobPostingRequest>,
) -> Result<Json<JobAnalysis>, AppError> {
    let entries = state.journal.list(&user_id).await?;
    let analysis = analyze_job(state.llm.as_ref(), &entries, &request).await?;
    Ok(Json(analysis))
}

/// GET /api/v1/users/:user_id/interview-prep/blurb
pub async fn handle_prep_blurb(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<PrepBlurb>, AppError> {
    let entries = state.journal.list(&user_id).await?;
    let blurb = prep_blurb(state.llm.as_ref(), &entries).await?;
    Ok(Json(blurb))
}
