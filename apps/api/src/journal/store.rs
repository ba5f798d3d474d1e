//! Entry Store: persistence seam for journal entries.
//!
//! `AppState` reaches the store only through `JournalRepository`, which holds
//! an `Arc<dyn EntryStore>`. Backends: `PgEntryStore` (PostgreSQL) and
//! `MemoryEntryStore` (no database configured, and tests).

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::AppError;
use crate::journal::models::{EntryPatch, JournalEntry, NewEntry};

#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Persists a new entry, assigning `id` and `timestamp`.
    async fn create(&self, user_id: &str, entry: NewEntry) -> Result<JournalEntry, AppError>;

    /// All entries for the user, newest first.
    async fn list(&self, user_id: &str) -> Result<Vec<JournalEntry>, AppError>;

    /// Overwrites only the fields present in `patch`.
    async fn update(
        &self,
        user_id: &str,
        entry_id: Uuid,
        patch: &EntryPatch,
    ) -> Result<JournalEntry, AppError>;
}

/// Newest first; ties broken by id so the order is stable.
pub fn newest_first(a: &JournalEntry, b: &JournalEntry) -> Ordering {
    b.timestamp.cmp(&a.timestamp).then_with(|| b.id.cmp(&a.id))
}

/// In-process store keyed by user id.
#[derive(Default)]
pub struct MemoryEntryStore {
    entries: RwLock<HashMap<String, Vec<JournalEntry>>>,
}

impl MemoryEntryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntryStore for MemoryEntryStore {
    async fn create(&self, user_id: &str, entry: NewEntry) -> Result<JournalEntry, AppError> {
        let entry = entry.into_entry(user_id, Uuid::new_v4(), Utc::now());
        self.entries
            .write()
            .await
            .entry(user_id.to_string())
            .or_default()
            .push(entry.clone());
        Ok(entry)
    }

    async fn list(&self, user_id: &str) -> Result<Vec<JournalEntry>, AppError> {
        let mut entries = self
            .entries
            .read()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or_default();
        entries.sort_by(newest_first);
        Ok(entries)
    }

    async fn update(
        &self,
        user_id: &str,
        entry_id: Uuid,
        patch: &EntryPatch,
    ) -> Result<JournalEntry, AppError> {
        let mut guard = self.entries.write().await;
        let entry = guard
            .get_mut(user_id)
            .and_then(|entries| entries.iter_mut().find(|e| e.id == entry_id))
            .ok_or_else(|| AppError::NotFound(format!("Entry {entry_id} not found")))?;
        patch.apply_to(entry);
        Ok(entry.clone())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::journal::models::Category;

    pub(crate) fn new_entry(title: &str) -> NewEntry {
        NewEntry {
            title: title.to_string(),
            content: format!("{title} content"),
            summary: vec![format!("Did {title}")],
            short_summary: format!("I did {title}."),
            hard_skills: vec!["Rust".into()],
            soft_skills: vec!["Teamwork".into()],
            categories: vec![Category::Project],
            reflection: "Learned a lot.".into(),
            achievement_type: "Project".into(),
        }
    }

    #[tokio::test]
    async fn test_create_then_list_round_trip() {
        let store = MemoryEntryStore::new();
        let submitted = new_entry("Team Project");
        let created = store.create("u1", submitted.clone()).await.unwrap();

        let listed = store.list("u1").await.unwrap();
        assert_eq!(listed.len(), 1);
        let expected = submitted.into_entry("u1", created.id, created.timestamp);
        assert_eq!(listed[0], expected);
    }

    #[tokio::test]
    async fn test_list_is_newest_first_and_scoped_per_user() {
        let store = MemoryEntryStore::new();
        store.create("u1", new_entry("first")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        store.create("u1", new_entry("second")).await.unwrap();
        store.create("u2", new_entry("other")).await.unwrap();

        let listed = store.list("u1").await.unwrap();
        let titles: Vec<_> = listed.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["second", "first"]);
        assert!(store.list("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_only_touches_patched_fields() {
        let store = MemoryEntryStore::new();
        let created = store.create("u1", new_entry("Draft")).await.unwrap();
        let patch = EntryPatch {
            reflection: Some("Rewritten".into()),
            ..Default::default()
        };
        let updated = store.update("u1", created.id, &patch).await.unwrap();
        assert_eq!(updated.reflection, "Rewritten");
        assert_eq!(updated.title, created.title);
        assert_eq!(updated.content, created.content);
        assert_eq!(store.list("u1").await.unwrap()[0], updated);
    }

    #[tokio::test]
    async fn test_update_other_users_entry_is_not_found() {
        let store = MemoryEntryStore::new();
        let created = store.create("u1", new_entry("Mine")).await.unwrap();
        let patch = EntryPatch {
            title: Some("Stolen".into()),
            ..Default::default()
        };
        let err = store.update("u2", created.id, &patch).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
