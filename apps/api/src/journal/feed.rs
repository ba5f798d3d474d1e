//! Live entry feed: one shared, reference-counted snapshot channel per user.
//!
//! Every subscriber for a user shares the same `watch` channel, so the list is
//! fetched once no matter how many consumers are listening. The channel (and
//! its cached snapshot) is dropped when the last subscription is released.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;
use tracing::debug;

use crate::journal::models::JournalEntry;

/// Full ordered entry list for one user, shared between subscribers.
pub type Snapshot = Arc<Vec<JournalEntry>>;

type Channels = HashMap<String, Arc<watch::Sender<Snapshot>>>;

#[derive(Clone, Default)]
pub struct EntryFeed {
    channels: Arc<Mutex<Channels>>,
}

impl EntryFeed {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Channels> {
        // Map mutations are single inserts/removes, so a poisoned map is still consistent.
        self.channels.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Subscribes to an existing channel, if any subscriber keeps one alive.
    pub fn try_subscribe(&self, user_id: &str) -> Option<EntrySubscription> {
        let channels = self.lock();
        let sender = channels.get(user_id)?;
        Some(EntrySubscription::new(
            self.clone(),
            user_id,
            sender.subscribe(),
        ))
    }

    /// Subscribes, seeding a new channel with `initial` when none exists.
    /// If another caller created the channel meanwhile, its snapshot wins.
    pub fn subscribe_or_seed(&self, user_id: &str, initial: Vec<JournalEntry>) -> EntrySubscription {
        let mut channels = self.lock();
        let sender = channels
            .entry(user_id.to_string())
            .or_insert_with(|| {
                debug!("Opening entry feed for user {user_id}");
                Arc::new(watch::channel(Arc::new(initial)).0)
            })
            .clone();
        EntrySubscription::new(self.clone(), user_id, sender.subscribe())
    }

    /// Latest cached snapshot, if the user has live subscribers.
    pub fn cached(&self, user_id: &str) -> Option<Snapshot> {
        self.lock().get(user_id).map(|tx| tx.borrow().clone())
    }

    pub fn is_active(&self, user_id: &str) -> bool {
        self.lock().contains_key(user_id)
    }

    /// Pushes a fresh snapshot to the user's subscribers. No-op without subscribers.
    pub fn publish(&self, user_id: &str, entries: Vec<JournalEntry>) {
        let sender = self.lock().get(user_id).cloned();
        if let Some(sender) = sender {
            sender.send_replace(Arc::new(entries));
            debug!(
                "Published entry snapshot to {} subscribers of {user_id}",
                sender.receiver_count()
            );
        }
    }

    #[cfg(test)]
    pub fn subscriber_count(&self, user_id: &str) -> usize {
        self.lock()
            .get(user_id)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }

    fn release(&self, user_id: &str) {
        let mut channels = self.lock();
        if channels
            .get(user_id)
            .is_some_and(|tx| tx.receiver_count() == 0)
        {
            channels.remove(user_id);
            debug!("Closed entry feed for user {user_id}");
        }
    }
}

/// A live listener on one user's entries. Dropping it unsubscribes.
pub struct EntrySubscription {
    feed: EntryFeed,
    user_id: String,
    rx: Option<watch::Receiver<Snapshot>>,
    primed: bool,
}

impl EntrySubscription {
    fn new(feed: EntryFeed, user_id: &str, rx: watch::Receiver<Snapshot>) -> Self {
        Self {
            feed,
            user_id: user_id.to_string(),
            rx: Some(rx),
            primed: false,
        }
    }

    /// First call yields the current snapshot; later calls wait for the next change.
    /// Returns `None` once the feed is gone.
    pub async fn next_snapshot(&mut self) -> Option<Snapshot> {
        let rx = self.rx.as_mut()?;
        if !self.primed {
            self.primed = true;
            return Some(rx.borrow_and_update().clone());
        }
        rx.changed().await.ok()?;
        Some(rx.borrow_and_update().clone())
    }

    pub fn unsubscribe(self) {}
}

impl Drop for EntrySubscription {
    fn drop(&mut self) {
        // The receiver must be gone before the count is checked.
        drop(self.rx.take());
        self.feed.release(&self.user_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::store::tests::new_entry;
    use chrono::Utc;
    use uuid::Uuid;

    fn entry(title: &str) -> JournalEntry {
        new_entry(title).into_entry("u1", Uuid::new_v4(), Utc::now())
    }

    #[tokio::test]
    async fn test_first_snapshot_is_seed() {
        let feed = EntryFeed::new();
        let mut sub = feed.subscribe_or_seed("u1", vec![entry("a")]);
        let snapshot = sub.next_snapshot().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].title, "a");
    }

    #[tokio::test]
    async fn test_publish_reaches_every_subscriber() {
        let feed = EntryFeed::new();
        let mut first = feed.subscribe_or_seed("u1", vec![]);
        let mut second = feed.try_subscribe("u1").unwrap();
        assert_eq!(feed.subscriber_count("u1"), 2);
        first.next_snapshot().await.unwrap();
        second.next_snapshot().await.unwrap();

        feed.publish("u1", vec![entry("b"), entry("a")]);
        assert_eq!(first.next_snapshot().await.unwrap().len(), 2);
        assert_eq!(second.next_snapshot().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_existing_channel_wins_over_new_seed() {
        let feed = EntryFeed::new();
        let _keep = feed.subscribe_or_seed("u1", vec![entry("cached")]);
        let mut late = feed.subscribe_or_seed("u1", vec![]);
        let snapshot = late.next_snapshot().await.unwrap();
        assert_eq!(snapshot[0].title, "cached");
    }

    #[test]
    fn test_last_drop_closes_channel() {
        let feed = EntryFeed::new();
        let first = feed.subscribe_or_seed("u1", vec![]);
        let second = feed.try_subscribe("u1").unwrap();
        drop(first);
        assert!(feed.is_active("u1"));
        second.unsubscribe();
        assert!(!feed.is_active("u1"));
        assert!(feed.cached("u1").is_none());
        assert!(feed.try_subscribe("u1").is_none());
    }

    #[test]
    fn test_publish_without_subscribers_is_noop() {
        let feed = EntryFeed::new();
        feed.publish("u1", vec![entry("ignored")]);
        assert!(!feed.is_active("u1"));
    }
}
