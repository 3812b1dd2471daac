#![allow(dead_code)]

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tokio::sync::watch;

use recipes::config::RecipesConfig;
use recipes::contract::model::Principal;
use recipes::domain::paths::StorePath;
use recipes::domain::ports::{IdentityProvider, RemoteStore, Snapshot, StoreError, Subscription};
use recipes::infra::memory::{MemoryIdentity, MemoryStore};
use recipes::Recipes;

pub const EMAIL: &str = "cook@example.com";
pub const PASSWORD: &str = "secret1";

/// Three well-formed recipes and one without a title.
pub fn sample_tree() -> Value {
    json!({
        "recipes": {
            "r1": {
                "title": "Lentil soup",
                "imageUrl": "https://img.example.com/lentils.jpg",
                "ingredients": [["Lentils", null, "200 g"], ["Carrot", null, 2]],
                "steps": ["Rinse", "Simmer"],
                "calories": 320
            },
            "r2": { "title": "Pancakes", "calorias_totales": 540 },
            "r3": { "title": "Green salad", "steps": ["Toss"] },
            "broken": { "calories": "plenty" }
        }
    })
}

/// Store wrapper that can hold one-shot reads, slow down `set` and fail writes.
#[derive(Clone)]
pub struct GatedStore {
    pub inner: MemoryStore,
    open: Arc<watch::Sender<bool>>,
    fail_writes: Arc<AtomicBool>,
    failing_writes: Arc<AtomicUsize>,
    set_delay_ms: Arc<AtomicU64>,
}

impl GatedStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            open: Arc::new(watch::Sender::new(true)),
            fail_writes: Arc::new(AtomicBool::new(false)),
            failing_writes: Arc::new(AtomicUsize::new(0)),
            set_delay_ms: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Reads wait until `open_reads` is called.
    pub fn hold_reads(&self) {
        self.open.send_replace(false);
    }

    pub fn open_reads(&self) {
        self.open.send_replace(true);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Only the next `count` writes fail.
    pub fn fail_next_writes(&self, count: usize) {
        self.failing_writes.store(count, Ordering::SeqCst);
    }

    /// `set` sleeps this long before touching the store; `remove` does not.
    pub fn delay_sets(&self, delay: Duration) {
        self.set_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    fn check_writes(&self) -> Result<(), StoreError> {
        let one_off = self
            .failing_writes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if one_off || self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("write rejected".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for GatedStore {
    async fn get(&self, path: &StorePath) -> Result<Snapshot, StoreError> {
        let mut open = self.open.subscribe();
        let _ = open.wait_for(|open| *open).await;
        self.inner.get(path).await
    }

    async fn set(&self, path: &StorePath, value: Value) -> Result<(), StoreError> {
        let delay = self.set_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        self.check_writes()?;
        self.inner.set(path, value).await
    }

    async fn update(&self, path: &StorePath, fields: Map<String, Value>) -> Result<(), StoreError> {
        self.check_writes()?;
        self.inner.update(path, fields).await
    }

    async fn remove(&self, path: &StorePath) -> Result<(), StoreError> {
        self.check_writes()?;
        self.inner.remove(path).await
    }

    fn subscribe(&self, path: &StorePath) -> Result<Subscription, StoreError> {
        self.inner.subscribe(path)
    }
}

/// Module over `store` with a fresh in-memory identity provider.
pub fn module_over(store: Arc<dyn RemoteStore>) -> (Recipes, Arc<MemoryIdentity>) {
    let identity = Arc::new(MemoryIdentity::new());
    let module = Recipes::new(&RecipesConfig::default(), store, identity.clone())
        .expect("default config is valid");
    (module, identity)
}

/// Module over a seeded memory store, with a signed-in user.
pub async fn seeded_signed_in() -> (Recipes, MemoryStore, Principal) {
    let store = MemoryStore::with_data(sample_tree());
    let (module, identity) = module_over(Arc::new(store.clone()));
    let principal = identity.register(EMAIL, PASSWORD).await.unwrap();
    (module, store, principal)
}

/// Poll `check` until it holds or a second has passed.
pub async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}

pub async fn within<T>(fut: impl Future<Output = T>) -> T {
    tokio::time::timeout(Duration::from_secs(2), fut)
        .await
        .expect("timed out")
}
