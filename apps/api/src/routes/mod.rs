pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::coach::handlers as coach;
use crate::interview::handlers as interview;
use crate::journal::handlers as journal;
use crate::state::AppState;
use crate::stats::handlers as stats;
use crate::users::handlers as users;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Users
        .route("/api/v1/users/sign-in", post(users::handle_sign_in))
        .route("/api/v1/users/:user_id", get(users::handle_get_profile))
        // Journal entries
        .route(
            "/api/v1/users/:user_id/entries",
            get(journal::handle_list_entries).post(journal::handle_create_entry),
        )
        .route(
            "/api/v1/users/:user_id/entries/enrich",
            post(journal::handle_enrich_preview),
        )
        .route(
            "/api/v1/users/:user_id/entries/stream",
            get(journal::handle_stream_entries),
        )
        .route(
            "/api/v1/users/:user_id/entries/:entry_id",
            patch(journal::handle_update_entry),
        )
        // Aggregation
        .route("/api/v1/users/:user_id/stats", get(stats::handle_get_stats))
        // Interview prep & coach
        .route(
            "/api/v1/users/:user_id/interview-prep",
            post(interview::handle_job_analysis),
        )
        .route(
            "/api/v1/users/:user_id/interview-prep/blurb",
            get(interview::handle_prep_blurb),
        )
        .route("/api/v1/users/:user_id/coach", post(coach::handle_coach_message))
        .with_state(state)
}
