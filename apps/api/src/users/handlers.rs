use axum::{
    extract::{Path, State},
    Json,
};

use crate::errors::AppError;
use crate::models::user::{SignInRequest, UserProfile};
use crate::state::AppState;
use crate::users::sign_in;

/// POST /api/v1/users/sign-in
///
/// Called by the app after the auth provider signs the user in.
pub async fn handle_sign_in(
    State(state): State<AppState>,
    Json(request): Json<SignInRequest>,
) -> Result<Json<UserProfile>, AppError> {
    let profile = sign_in(state.users.as_ref(), request).await?;
    Ok(Json(profile))
}

/// GET /api/v1/users/:user_id
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserProfile>, AppError> {
    let profile = state
        .users
        .get(&user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;
    Ok(Json(profile))
}
