use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::watch;

use crate::domain::paths::StorePath;

/// Value found at a path; `None` when nothing is stored there.
pub type Snapshot = Option<Value>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("listener cancelled: {0}")]
    Cancelled(String),

    #[error("invalid path: '{0}'")]
    InvalidPath(String),

    #[error("cannot encode value: {0}")]
    Serialization(String),
}

/// Port for the hosted document store. Addressed by path, with one-shot reads,
/// continuous subscriptions, writes and deletes.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// One-shot read.
    async fn get(&self, path: &StorePath) -> Result<Snapshot, StoreError>;
    /// Replace the value at `path`.
    async fn set(&self, path: &StorePath, value: Value) -> Result<(), StoreError>;
    /// Merge `fields` into the object at `path`, leaving other children alone.
    async fn update(&self, path: &StorePath, fields: Map<String, Value>) -> Result<(), StoreError>;
    /// Delete the value at `path`. Deleting a missing path succeeds.
    async fn remove(&self, path: &StorePath) -> Result<(), StoreError>;
    /// Live view of `path`: the current value first, then every change.
    fn subscribe(&self, path: &StorePath) -> Result<Subscription, StoreError>;
}

/// What a backend publishes to a listener.
#[derive(Debug, Clone, PartialEq)]
pub enum SubscriptionEvent {
    Value(Snapshot),
    /// Terminal; nothing is delivered afterwards.
    Cancelled(StoreError),
}

type Release = Box<dyn FnOnce() + Send + Sync>;

/// Live listener on a store path.
///
/// Rapid successive changes may be coalesced; the latest value is always delivered.
/// Dropping the subscription detaches the listener from the backend.
pub struct Subscription {
    rx: watch::Receiver<SubscriptionEvent>,
    delivered_initial: bool,
    finished: bool,
    release: Option<Release>,
}

impl Subscription {
    /// `release` runs exactly once when the subscription is dropped.
    pub fn new(
        rx: watch::Receiver<SubscriptionEvent>,
        release: impl FnOnce() + Send + Sync + 'static,
    ) -> Self {
        Self {
            rx,
            delivered_initial: false,
            finished: false,
            release: Some(Box::new(release)),
        }
    }

    /// Next snapshot. `Some(Err(_))` is the terminal failure; `None` once finished
    /// or when the backend went away.
    pub async fn next(&mut self) -> Option<Result<Snapshot, StoreError>> {
        if self.finished {
            return None;
        }
        if self.delivered_initial {
            if self.rx.changed().await.is_err() {
                self.finished = true;
                return None;
            }
        } else {
            self.delivered_initial = true;
        }

        let event = self.rx.borrow_and_update().clone();
        match event {
            SubscriptionEvent::Value(v) => Some(Ok(v)),
            SubscriptionEvent::Cancelled(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }

    pub fn into_stream(self) -> BoxStream<'static, Result<Snapshot, StoreError>> {
        stream::unfold(self, |mut sub| async move {
            let item = sub.next().await?;
            Some((item, sub))
        })
        .boxed()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("delivered_initial", &self.delivered_initial)
            .field("finished", &self.finished)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn delivers_initial_then_changes_then_stops_on_cancel() {
        let (tx, rx) = watch::channel(SubscriptionEvent::Value(None));
        let mut sub = Subscription::new(rx, || {});

        assert_eq!(sub.next().await, Some(Ok(None)));

        tx.send(SubscriptionEvent::Value(Some(json!(true)))).unwrap();
        assert_eq!(sub.next().await, Some(Ok(Some(json!(true)))));

        tx.send(SubscriptionEvent::Cancelled(StoreError::Cancelled("gone".into())))
            .unwrap();
        assert!(matches!(sub.next().await, Some(Err(StoreError::Cancelled(_)))));
        assert_eq!(sub.next().await, None);
    }

    #[tokio::test]
    async fn ends_when_backend_drops_sender() {
        let (tx, rx) = watch::channel(SubscriptionEvent::Value(Some(json!(1))));
        let mut sub = Subscription::new(rx, || {});
        assert!(sub.next().await.is_some());
        drop(tx);
        assert_eq!(sub.next().await, None);
    }

    #[test]
    fn release_runs_once_on_drop() {
        let released = Arc::new(AtomicUsize::new(0));
        let counter = released.clone();
        let (_tx, rx) = watch::channel(SubscriptionEvent::Value(None));
        let sub = Subscription::new(rx, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        drop(sub);
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }
}
