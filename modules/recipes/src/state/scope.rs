use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};

/// Background work owned by a screen. Dropping the scope cancels all of it,
/// which drops any live subscription the tasks were holding.
pub(crate) struct Scope {
    token: CancellationToken,
    _guard: DropGuard,
}

impl Scope {
    pub(crate) fn new() -> Self {
        let token = CancellationToken::new();
        Self {
            _guard: token.clone().drop_guard(),
            token,
        }
    }

    /// Run `fut` until it completes or the scope is cancelled.
    pub(crate) fn spawn<F>(&self, fut: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        spawn_until(self.token.child_token(), fut)
    }

    /// A replaceable slot for one live subscription.
    pub(crate) fn slot(&self) -> WatchSlot {
        WatchSlot {
            parent: self.token.clone(),
            current: Arc::new(Mutex::new(None)),
        }
    }

    /// A queue whose work runs one item at a time, in push order.
    pub(crate) fn queue(&self) -> WriteQueue {
        WriteQueue {
            parent: self.token.clone(),
            tail: Arc::new(Mutex::new(None)),
        }
    }
}

/// Holds at most one running watch; starting a new one cancels the previous.
#[derive(Clone)]
pub(crate) struct WatchSlot {
    parent: CancellationToken,
    current: Arc<Mutex<Option<CancellationToken>>>,
}

impl WatchSlot {
    pub(crate) fn replace<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let token = self.parent.child_token();
        if let Some(previous) = self.current.lock().replace(token.clone()) {
            previous.cancel();
        }
        spawn_until(token, fut);
    }

    pub(crate) fn clear(&self) {
        if let Some(previous) = self.current.lock().take() {
            previous.cancel();
        }
    }
}

/// Serializes writes issued from one screen.
///
/// Each pushed item waits for the previous one to finish (or be cancelled)
/// before it starts.
#[derive(Clone)]
pub(crate) struct WriteQueue {
    parent: CancellationToken,
    tail: Arc<Mutex<Option<oneshot::Receiver<()>>>>,
}

impl WriteQueue {
    pub(crate) fn push<F>(&self, fut: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let (done, finished) = oneshot::channel();
        let previous = self.tail.lock().replace(finished);
        spawn_until(self.parent.child_token(), async move {
            if let Some(previous) = previous {
                let _ = previous.await;
            }
            fut.await;
            let _ = done.send(());
        })
    }
}

fn spawn_until<F>(token: CancellationToken, fut: F) -> JoinHandle<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {}
            _ = fut => {}
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn replacing_a_watch_cancels_the_previous_one() {
        let scope = Scope::new();
        let slot = scope.slot();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<&'static str>();

        struct Tell(tokio::sync::mpsc::UnboundedSender<&'static str>, &'static str);
        impl Drop for Tell {
            fn drop(&mut self) {
                let _ = self.0.send(self.1);
            }
        }

        let first = Tell(tx.clone(), "first");
        slot.replace(async move {
            let _held = first;
            std::future::pending::<()>().await;
        });
        let second = Tell(tx, "second");
        slot.replace(async move {
            let _held = second;
            std::future::pending::<()>().await;
        });

        assert_eq!(rx.recv().await, Some("first"));
        drop(scope);
        assert_eq!(
            tokio::time::timeout(Duration::from_secs(1), rx.recv()).await.unwrap(),
            Some("second")
        );
    }

    #[tokio::test]
    async fn queued_work_runs_in_push_order() {
        let scope = Scope::new();
        let queue = scope.queue();
        let order = Arc::new(Mutex::new(Vec::new()));

        let slow = order.clone();
        let first = queue.push(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            slow.lock().push(1);
        });
        let fast = order.clone();
        let second = queue.push(async move {
            fast.lock().push(2);
        });

        second.await.unwrap();
        first.await.unwrap();
        assert_eq!(*order.lock(), vec![1, 2]);
    }

    #[tokio::test]
    async fn cancelled_queue_item_does_not_block_the_next() {
        let scope = Scope::new();
        let queue = scope.queue();
        let stuck = queue.push(std::future::pending::<()>());
        stuck.abort();

        let next = queue.push(async {});
        tokio::time::timeout(Duration::from_secs(1), next)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn spawned_work_runs_to_completion() {
        let scope = Scope::new();
        let handle = scope.spawn(async {});
        handle.await.unwrap();
    }
}
