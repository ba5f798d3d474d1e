use std::sync::Arc;

use crate::journal::repository::JournalRepository;
use crate::llm_client::TextGenerator;
use crate::users::UserStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Shared entry repository: store access plus the per-user live feed.
    pub journal: JournalRepository,
    pub users: Arc<dyn UserStore>,
    /// Model client. `LlmClient` in production, stubs in tests.
    pub llm: Arc<dyn TextGenerator>,
}
