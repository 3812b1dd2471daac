//! Single-writer observable cells.

use tokio::sync::watch;

/// Create a cell holding `initial`, returning its only writer and a reader.
pub fn cell<T>(initial: T) -> (Producer<T>, Observable<T>) {
    let (tx, rx) = watch::channel(initial);
    (Producer { tx }, Observable { rx })
}

/// The writing end of a cell. Not `Clone`: a cell has exactly one producer.
#[derive(Debug)]
pub struct Producer<T> {
    tx: watch::Sender<T>,
}

impl<T> Producer<T> {
    pub fn new(initial: T) -> Self {
        Self {
            tx: watch::Sender::new(initial),
        }
    }

    /// Publish `value`; readers are woken even when it equals the previous one.
    pub fn set(&self, value: T) {
        self.tx.send_replace(value);
    }

    /// A new reader positioned at the current value.
    pub fn observe(&self) -> Observable<T> {
        Observable {
            rx: self.tx.subscribe(),
        }
    }
}

impl<T: Clone> Producer<T> {
    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }
}

/// Read-only view of a cell.
#[derive(Debug, Clone)]
pub struct Observable<T> {
    rx: watch::Receiver<T>,
}

impl<T: Clone> Observable<T> {
    pub fn get(&self) -> T {
        self.rx.borrow().clone()
    }

    /// Wait for the next published value. `None` once the producer is gone.
    pub async fn changed(&mut self) -> Option<T> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Wait until the value satisfies `pred`, checking the current value first.
    pub async fn wait_for(&mut self, pred: impl FnMut(&T) -> bool) -> Option<T> {
        self.rx.wait_for(pred).await.ok().map(|v| v.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_pending, assert_ready_eq, task};

    #[tokio::test]
    async fn readers_see_every_publication() {
        let (producer, mut reader) = cell(false);
        assert!(!reader.get());

        producer.set(true);
        assert_eq!(reader.changed().await, Some(true));

        producer.set(true);
        assert_eq!(reader.changed().await, Some(true));
    }

    #[test]
    fn changed_waits_for_the_next_publication() {
        let (producer, mut reader) = cell(1u32);
        let mut next = task::spawn(reader.changed());
        assert_pending!(next.poll());

        producer.set(2);
        assert!(next.is_woken());
        assert_ready_eq!(next.poll(), Some(2));
    }

    #[test]
    fn wait_for_stays_pending_until_the_predicate_holds() {
        let producer = Producer::new(0u32);
        let mut reader = producer.observe();
        let mut ready = task::spawn(reader.wait_for(|v| *v >= 2));
        assert_pending!(ready.poll());

        producer.set(1);
        assert_pending!(ready.poll());
        producer.set(2);
        assert_ready_eq!(ready.poll(), Some(2));
    }

    #[tokio::test]
    async fn changed_ends_when_producer_dropped() {
        let (producer, mut reader) = cell(0u32);
        drop(producer);
        assert_eq!(reader.changed().await, None);
        assert_eq!(reader.get(), 0);
    }

    #[tokio::test]
    async fn observe_starts_at_current_value() {
        let producer = Producer::new(String::from("a"));
        producer.set("b".into());
        let mut reader = producer.observe();
        assert_eq!(reader.get(), "b");
        assert_eq!(reader.wait_for(|v| v == "b").await.as_deref(), Some("b"));
    }
}
