//! In-process change notifications for the record ledger.
//!
//! The ledger publishes a [`RecordChange`] after every committed mutation.
//! Listeners register a callback and hold the returned [`Subscription`];
//! dropping it (or calling [`Subscription::unsubscribe`]) removes the callback.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordChange {
    Added(Vec<i64>),
    Removed(i64),
}

type Listener = Arc<dyn Fn(&RecordChange) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(u64, Listener)>>,
}

impl Registry {
    fn listeners(&self) -> MutexGuard<'_, Vec<(u64, Listener)>> {
        // A panicking listener never runs under this lock, so the list is intact.
        self.listeners.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn remove(&self, id: u64) {
        self.listeners().retain(|(listener_id, _)| *listener_id != id);
    }
}

#[derive(Clone, Default)]
pub struct ChangeFeed {
    registry: Arc<Registry>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&RecordChange) + Send + Sync + 'static,
    {
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        self.registry.listeners().push((id, Arc::new(listener)));
        tracing::debug!(subscription = id, "change feed listener registered");

        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Calls every registered listener in registration order. Listeners run
    /// outside the registry lock and may subscribe or unsubscribe freely.
    pub fn publish(&self, change: &RecordChange) {
        let listeners: Vec<Listener> = self
            .registry
            .listeners()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        tracing::debug!(?change, listeners = listeners.len(), "publishing record change");
        for listener in listeners {
            listener(change);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.registry.listeners().len()
    }
}

#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    registry: Weak<Registry>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        // Drop does the work.
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
            tracing::debug!(subscription = self.id, "change feed listener removed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_publish_reaches_live_listeners() {
        let feed = ChangeFeed::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        let _sub = feed.subscribe(move |change| sink.lock().unwrap().push(change.clone()));

        feed.publish(&RecordChange::Added(vec![1, 2]));
        feed.publish(&RecordChange::Removed(1));

        assert_eq!(
            *seen.lock().unwrap(),
            vec![RecordChange::Added(vec![1, 2]), RecordChange::Removed(1)]
        );
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let feed = ChangeFeed::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&calls);
        let sub = feed.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let counter = Arc::clone(&calls);
        let other = feed.subscribe(move |_| {
            counter.fetch_add(10, Ordering::SeqCst);
        });
        assert_eq!(feed.listener_count(), 2);

        feed.publish(&RecordChange::Removed(7));
        sub.unsubscribe();
        feed.publish(&RecordChange::Removed(8));
        drop(other);
        feed.publish(&RecordChange::Removed(9));

        assert_eq!(calls.load(Ordering::SeqCst), 21);
        assert_eq!(feed.listener_count(), 0);
    }

    #[test]
    fn test_subscription_outlives_feed() {
        let feed = ChangeFeed::new();
        let sub = feed.subscribe(|_| {});
        drop(feed);
        sub.unsubscribe();
    }
}
