use axum::{
    extract::{Path, State},
    Json,
};

use crate::errors::AppError;
use crate::stats::{compute_stats, StatsReport};
use crate::state::AppState;

/// GET /api/v1/users/:user_id/stats
pub async fn handle_get_stats(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<StatsReport>, AppError> {
    let entries = state.journal.list(&user_id).await?;
    Ok(Json(compute_stats(&entries)))
}
