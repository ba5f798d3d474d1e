use axum::{
    extract::{Path, State},
    Json,
};

use crate::coach::{reply, CoachReply, CoachRequest};
use crate::errors::AppError;
use crate::state::AppState;

/// POST /api/v1/users/:user_id/coach
pub async fn handle_coach_message(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<CoachRequest>,
) -> Result<Json<CoachReply>, AppError> {
    let entries = state.journal.list(&user_id).await?;
    let response = reply(state.llm.as_ref(), &entries, request).await?;
    Ok(Json(response))
}
