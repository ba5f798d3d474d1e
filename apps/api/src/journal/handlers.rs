use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::{self, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::enrichment::{enrich, Enrichment};
use crate::errors::AppError;
use crate::journal::models::{CaptureSource, Category, EntryPatch, JournalEntry};
use crate::journal::search::{filter_entries, CategoryFilter};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct EnrichRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateEntryRequest {
    pub content: String,
    #[serde(default)]
    pub source: CaptureSource,
    /// A previewed (and possibly user-edited) enrichment. When absent the
    /// content is enriched as part of the request.
    pub enrichment: Option<Enrichment>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EntryListQuery {
    pub q: Option<String>,
    /// Currently selected category chip.
    pub category: Option<Category>,
    /// Chip the user just tapped; toggles against `category`.
    pub toggle: Option<Category>,
}

#[derive(Debug, Serialize)]
pub struct EntryListResponse {
    pub entries: Vec<JournalEntry>,
    pub selected_category: Option<Category>,
    pub total: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/users/:user_id/entries/enrich
///
/// Runs enrichment without persisting, so the user can review and edit.
pub async fn handle_enrich_preview(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<EnrichRequest>,
) -> Result<Json<Enrichment>, AppError> {
    info!("Enrichment preview for user {user_id}");
    let enrichment = enrich(state.llm.as_ref(), &request.content).await?;
    Ok(Json(enrichment))
}

/// POST /api/v1/users/:user_id/entries
///
/// Capture → enrichment → store write. Returns the stored entry.
pub async fn handle_create_entry(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<CreateEntryRequest>,
) -> Result<(StatusCode, Json<JournalEntry>), AppError> {
    if !request.source.is_supported() {
        return Err(AppError::Validation(format!(
            "capture source {:?} is not supported; use text or voice",
            request.source
        )));
    }
    let content = request.content.trim().to_string();
    if content.is_empty() {
        return Err(AppError::Validation("content cannot be empty".to_string()));
    }

    let enrichment = match request.enrichment {
        Some(enrichment) => enrichment,
        None => enrich(state.llm.as_ref(), &content).await?,
    };

    let entry = state
        .journal
        .create(&user_id, enrichment.into_new_entry(content))
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET /api/v1/users/:user_id/entries?q=&category=&toggle=
pub async fn handle_list_entries(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(params): Query<EntryListQuery>,
) -> Result<Json<EntryListResponse>, AppError> {
    let mut filter = CategoryFilter::default();
    if let Some(category) = params.category {
        filter.toggle(category);
    }
    if let Some(tapped) = params.toggle {
        filter.toggle(tapped);
    }

    let snapshot = state.journal.list(&user_id).await?;
    let entries: Vec<JournalEntry> = filter_entries(
        &snapshot,
        params.q.as_deref().unwrap_or_default(),
        filter.selected(),
    )
    .into_iter()
    .cloned()
    .collect();

    Ok(Json(EntryListResponse {
        total: snapshot.len(),
        entries,
        selected_category: filter.selected(),
    }))
}

/// GET /api/v1/users/:user_id/entries/stream
///
/// Server-Sent Events: one `entries` event with the full ordered list on
/// connect and after every change. Disconnecting releases the subscription.
pub async fn handle_stream_entries(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let subscription = state.journal.subscribe(&user_id).await?;
    info!("Entry stream opened for user {user_id}");

    let events = stream::unfold(subscription, |mut subscription| async move {
        let snapshot = subscription.next_snapshot().await?;
        Some((snapshot, subscription))
    })
    .filter_map(|snapshot| async move {
        match Event::default().event("entries").json_data(&*snapshot) {
            Ok(event) => Some(Ok(event)),
            Err(e) => {
                warn!("Failed to encode entry snapshot: {e}");
                None
            }
        }
    });

    Ok(Sse::new(events).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(30))
            .text("keep-alive"),
    ))
}

/// PATCH /api/v1/users/:user_id/entries/:entry_id
pub async fn handle_update_entry(
    State(state): State<AppState>,
    Path((user_id, entry_id)): Path<(String, Uuid)>,
    Json(patch): Json<EntryPatch>,
) -> Result<Json<JournalEntry>, AppError> {
    let updated = state.journal.update(&user_id, entry_id, &patch).await?;
    Ok(Json(updated))
}
