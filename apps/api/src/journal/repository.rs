//! Journal Repository: the single shared access point for entries.
//!
//! Flow: writes go to the `EntryStore`, then the user's live feed (if any) is
//! refreshed from the store. Reads serve the feed's cached snapshot when one
//! is live and fall back to the store otherwise.
//!
//! Seeding a feed and refreshing it both hold the user's feed lock across the
//! store read and the publish, so a snapshot is never older than a write that
//! completed before it was read.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::journal::feed::{EntryFeed, EntrySubscription, Snapshot};
use crate::journal::models::{EntryPatch, JournalEntry, NewEntry};
use crate::journal::store::EntryStore;

type FeedLocks = HashMap<String, Arc<AsyncMutex<()>>>;

#[derive(Clone)]
pub struct JournalRepository {
    store: Arc<dyn EntryStore>,
    feed: EntryFeed,
    feed_locks: Arc<Mutex<FeedLocks>>,
}

impl JournalRepository {
    pub fn new(store: Arc<dyn EntryStore>) -> Self {
        Self {
            store,
            feed: EntryFeed::new(),
            feed_locks: Arc::default(),
        }
    }

    #[cfg(test)]
    pub fn feed(&self) -> &EntryFeed {
        &self.feed
    }

    fn feed_lock(&self, user_id: &str) -> Arc<AsyncMutex<()>> {
        self.feed_locks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(user_id.to_string())
            .or_default()
            .clone()
    }

    pub async fn create(&self, user_id: &str, entry: NewEntry) -> Result<JournalEntry, AppError> {
        let created = self.store.create(user_id, entry).await?;
        info!("Created entry {} for user {user_id}", created.id);
        self.refresh(user_id).await;
        Ok(created)
    }

    pub async fn update(
        &self,
        user_id: &str,
        entry_id: Uuid,
        patch: &EntryPatch,
    ) -> Result<JournalEntry, AppError> {
        if patch.is_empty() {
            return Err(AppError::Validation(
                "update must change at least one field".to_string(),
            ));
        }
        let updated = self.store.update(user_id, entry_id, patch).await?;
        self.refresh(user_id).await;
        Ok(updated)
    }

    /// All entries for the user, newest first.
    pub async fn list(&self, user_id: &str) -> Result<Snapshot, AppError> {
        if let Some(snapshot) = self.feed.cached(user_id) {
            return Ok(snapshot);
        }
        Ok(Arc::new(self.store.list(user_id).await?))
    }

    /// Opens (or joins) the user's live feed.
    pub async fn subscribe(&self, user_id: &str) -> Result<EntrySubscription, AppError> {
        if let Some(subscription) = self.feed.try_subscribe(user_id) {
            return Ok(subscription);
        }
        let lock = self.feed_lock(user_id);
        let _guard = lock.lock().await;
        // Another subscriber may have seeded the feed while we waited.
        if let Some(subscription) = self.feed.try_subscribe(user_id) {
            return Ok(subscription);
        }
        let entries = self.store.list(user_id).await?;
        Ok(self.feed.subscribe_or_seed(user_id, entries))
    }

    /// Invokes `callback` with the full ordered list now and after every change,
    /// until the returned handle is unsubscribed or dropped.
    pub async fn subscribe_with<F>(
        &self,
        user_id: &str,
        mut callback: F,
    ) -> Result<SubscriptionHandle, AppError>
    where
        F: FnMut(Snapshot) + Send + 'static,
    {
        let mut subscription = self.subscribe(user_id).await?;
        let task = tokio::spawn(async move {
            while let Some(snapshot) = subscription.next_snapshot().await {
                callback(snapshot);
            }
        });
        Ok(SubscriptionHandle { task })
    }

    /// Reloads the user's list into the live feed. A failed reload leaves the
    /// previous snapshot in place; the write itself already succeeded.
    async fn refresh(&self, user_id: &str) {
        let lock = self.feed_lock(user_id);
        let _guard = lock.lock().await;
        if !self.feed.is_active(user_id) {
            return;
        }
        match self.store.list(user_id).await {
            Ok(entries) => self.feed.publish(user_id, entries),
            Err(e) => warn!("Failed to refresh entry feed for {user_id}: {e}"),
        }
    }
}

/// Stops a `subscribe_with` listener when unsubscribed or dropped.
pub struct SubscriptionHandle {
    task: JoinHandle<()>,
}

impl SubscriptionHandle {
    pub fn unsubscribe(self) {}
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::mpsc;

    use super::*;
    use crate::journal::models::Category;
    use crate::journal::store::tests::new_entry;
    use crate::journal::store::MemoryEntryStore;

    fn repository() -> JournalRepository {
        JournalRepository::new(Arc::new(MemoryEntryStore::new()))
    }

    /// Reads the first list, then stalls before returning it, so a write can
    /// land between the read and the feed being seeded.
    #[derive(Default)]
    struct SlowFirstListStore {
        inner: MemoryEntryStore,
        stalled: AtomicBool,
    }

    #[async_trait]
    impl EntryStore for SlowFirstListStore {
        async fn create(&self, user_id: &str, entry: NewEntry) -> Result<JournalEntry, AppError> {
            self.inner.create(user_id, entry).await
        }

        async fn list(&self, user_id: &str) -> Result<Vec<JournalEntry>, AppError> {
            let entries = self.inner.list(user_id).await?;
            if !self.stalled.swap(true, Ordering::SeqCst) {
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
            Ok(entries)
        }

        async fn update(
            &self,
            user_id: &str,
            entry_id: Uuid,
            patch: &EntryPatch,
        ) -> Result<JournalEntry, AppError> {
            self.inner.update(user_id, entry_id, patch).await
        }
    }

    #[tokio::test]
    async fn test_write_during_feed_seeding_is_not_lost() {
        let repo = JournalRepository::new(Arc::new(SlowFirstListStore::default()));

        let subscriber = repo.clone();
        let pending = tokio::spawn(async move { subscriber.subscribe("u1").await });
        tokio::time::sleep(Duration::from_millis(20)).await;

        let created = repo.create("u1", new_entry("raced")).await.unwrap();
        let mut sub = pending.await.unwrap().unwrap();

        let listed = repo.list("u1").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, created.id);
        let latest = sub.next_snapshot().await.unwrap();
        assert_eq!(latest[0].id, created.id);
    }

    #[tokio::test]
    async fn test_concurrent_writes_leave_latest_snapshot() {
        let repo = repository();
        let _sub = repo.subscribe("u1").await.unwrap();

        let writes = (0..8).map(|i| {
            let repo = repo.clone();
            tokio::spawn(async move { repo.create("u1", new_entry(&format!("e{i}"))).await })
        });
        for write in futures::future::join_all(writes).await {
            write.unwrap().unwrap();
        }

        assert_eq!(repo.list("u1").await.unwrap().len(), 8);
    }

    #[tokio::test]
    async fn test_created_entry_heads_the_list() {
        let repo = repository();
        repo.create("u1", new_entry("older")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        let created = repo.create("u1", new_entry("newer")).await.unwrap();

        let listed = repo.list("u1").await.unwrap();
        assert_eq!(listed[0].id, created.id);
        assert_eq!(listed.len(), 2);
    }

    #[tokio::test]
    async fn test_subscription_sees_writes() {
        let repo = repository();
        let mut sub = repo.subscribe("u1").await.unwrap();
        assert!(sub.next_snapshot().await.unwrap().is_empty());

        repo.create("u1", new_entry("live")).await.unwrap();
        let snapshot = sub.next_snapshot().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].title, "live");
    }

    #[tokio::test]
    async fn test_list_served_from_shared_snapshot_while_subscribed() {
        let repo = repository();
        let _sub = repo.subscribe("u1").await.unwrap();
        let created = repo.create("u1", new_entry("cached")).await.unwrap();
        let first = repo.list("u1").await.unwrap();
        let second = repo.list("u1").await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first[0].id, created.id);
    }

    #[tokio::test]
    async fn test_update_pushes_new_snapshot() {
        let repo = repository();
        let created = repo.create("u1", new_entry("before")).await.unwrap();
        let mut sub = repo.subscribe("u1").await.unwrap();
        sub.next_snapshot().await.unwrap();

        let patch = EntryPatch {
            title: Some("after".into()),
            categories: Some(vec![Category::Research]),
            ..Default::default()
        };
        repo.update("u1", created.id, &patch).await.unwrap();
        let snapshot = sub.next_snapshot().await.unwrap();
        assert_eq!(snapshot[0].title, "after");
        assert_eq!(snapshot[0].categories, vec!["research"]);
    }

    #[tokio::test]
    async fn test_empty_patch_rejected() {
        let repo = repository();
        let created = repo.create("u1", new_entry("x")).await.unwrap();
        let err = repo
            .update("u1", created.id, &EntryPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_callback_subscription_and_unsubscribe() {
        let repo = repository();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = repo
            .subscribe_with("u1", move |snapshot| {
                let _ = tx.send(snapshot.len());
            })
            .await
            .unwrap();

        assert_eq!(rx.recv().await, Some(0));
        repo.create("u1", new_entry("one")).await.unwrap();
        assert_eq!(rx.recv().await, Some(1));

        handle.unsubscribe();
        // The aborted task drops its subscription and the callback's sender.
        assert_eq!(rx.recv().await, None);
        assert!(!repo.feed().is_active("u1"));
    }
}
