use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde_json::{Map, Value};
use tokio::sync::watch;
use tracing::{debug, trace};

use crate::domain::paths::StorePath;
use crate::domain::ports::{RemoteStore, Snapshot, StoreError, Subscription, SubscriptionEvent};

struct Listener {
    path: StorePath,
    tx: watch::Sender<SubscriptionEvent>,
}

#[derive(Default)]
struct Inner {
    root: RwLock<Value>,
    listeners: Mutex<HashMap<u64, Listener>>,
    next_listener: AtomicU64,
    offline: AtomicBool,
}

/// In-process document tree with the same path semantics as the hosted store.
///
/// Nodes without children do not exist: removing the last child of an object
/// removes the object too. Listeners are notified when a write touches their path,
/// an ancestor or a descendant, and only when their value actually changed.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `root` as the whole tree.
    pub fn with_data(root: Value) -> Self {
        let store = Self::new();
        *store.inner.root.write() = prune(root).unwrap_or(Value::Null);
        store
    }

    /// While offline, one-shot reads and writes fail with `StoreError::Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.inner.offline.store(offline, Ordering::SeqCst);
    }

    /// Deliver a terminal cancellation to every live listener.
    pub fn cancel_listeners(&self, reason: &str) {
        let mut listeners = self.inner.listeners.lock();
        for (_, listener) in listeners.drain() {
            let _ = listener
                .tx
                .send(SubscriptionEvent::Cancelled(StoreError::Cancelled(reason.to_string())));
        }
    }

    /// Number of attached listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.lock().len()
    }

    /// Copy of the whole tree.
    pub fn dump(&self) -> Value {
        self.inner.root.read().clone()
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if self.inner.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store is offline".to_string()));
        }
        Ok(())
    }

    /// Apply `mutate` to the tree and notify overlapping listeners.
    fn write(&self, path: &StorePath, mutate: impl FnOnce(&mut Value)) {
        let mut root = self.inner.root.write();
        mutate(&mut *root);
        if is_empty_node(&root) {
            *root = Value::Null;
        }

        let listeners = self.inner.listeners.lock();
        for listener in listeners.values().filter(|l| l.path.overlaps(path)) {
            let current = lookup(&root, &listener.path).cloned();
            let changed = listener.tx.send_if_modified(|event| {
                let new_event = SubscriptionEvent::Value(current.clone());
                if *event == new_event {
                    false
                } else {
                    *event = new_event;
                    true
                }
            });
            if changed {
                trace!(listener = %listener.path, written = %path, "Listener notified");
            }
        }
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn get(&self, path: &StorePath) -> Result<Snapshot, StoreError> {
        self.ensure_online()?;
        Ok(lookup(&self.inner.root.read(), path).cloned())
    }

    async fn set(&self, path: &StorePath, value: Value) -> Result<(), StoreError> {
        self.ensure_online()?;
        match prune(value) {
            Some(value) => self.write(path, |root| insert_at(root, path, value)),
            None => self.write(path, |root| remove_at(root, path)),
        }
        debug!(path = %path, "Value written");
        Ok(())
    }

    async fn update(&self, path: &StorePath, fields: Map<String, Value>) -> Result<(), StoreError> {
        self.ensure_online()?;
        let mut children = Vec::with_capacity(fields.len());
        for (key, value) in fields {
            children.push((path.child(&key)?, prune(value)));
        }
        self.write(path, |root| {
            for (child, value) in children {
                match value {
                    Some(value) => insert_at(root, &child, value),
                    None => remove_at(root, &child),
                }
            }
        });
        debug!(path = %path, "Children merged");
        Ok(())
    }

    async fn remove(&self, path: &StorePath) -> Result<(), StoreError> {
        self.ensure_online()?;
        self.write(path, |root| remove_at(root, path));
        debug!(path = %path, "Value removed");
        Ok(())
    }

    fn subscribe(&self, path: &StorePath) -> Result<Subscription, StoreError> {
        let root = self.inner.root.read();
        let (tx, rx) = watch::channel(SubscriptionEvent::Value(lookup(&root, path).cloned()));

        let id = self.inner.next_listener.fetch_add(1, Ordering::Relaxed);
        self.inner.listeners.lock().insert(
            id,
            Listener {
                path: path.clone(),
                tx,
            },
        );
        drop(root);
        debug!(path = %path, listener = id, "Listener attached");

        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        Ok(Subscription::new(rx, move || {
            if let Some(inner) = weak.upgrade() {
                if inner.listeners.lock().remove(&id).is_some() {
                    debug!(listener = id, "Listener released");
                }
            }
        }))
    }
}

// -------- tree helpers --------

fn is_empty_node(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::Object(m) => m.is_empty(),
        Value::Array(a) => a.is_empty(),
        _ => false,
    }
}

/// Drop empty containers recursively; `None` when nothing is left.
fn prune(value: Value) -> Option<Value> {
    match value {
        Value::Object(map) => {
            let kept: Map<String, Value> = map
                .into_iter()
                .filter_map(|(k, v)| prune(v).map(|v| (k, v)))
                .collect();
            (!kept.is_empty()).then_some(Value::Object(kept))
        }
        Value::Array(items) => (!items.is_empty()).then_some(Value::Array(items)),
        Value::Null => None,
        other => Some(other),
    }
}

fn lookup<'a>(root: &'a Value, path: &StorePath) -> Option<&'a Value> {
    let mut node = root;
    for segment in path.segments() {
        node = match node {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    (!is_empty_node(node)).then_some(node)
}

fn insert_at(root: &mut Value, path: &StorePath, value: Value) {
    let segments: Vec<&str> = path.segments().collect();
    insert_rec(root, &segments, value);
}

/// Non-object nodes on the way are replaced by objects.
fn insert_rec(node: &mut Value, segments: &[&str], value: Value) {
    let Some((first, rest)) = segments.split_first() else {
        *node = value;
        return;
    };
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    if let Value::Object(map) = node {
        let child = map.entry(first.to_string()).or_insert(Value::Null);
        insert_rec(child, rest, value);
    }
}

/// Remove the node at `path`, then every ancestor left without children.
fn remove_at(root: &mut Value, path: &StorePath) {
    let segments: Vec<&str> = path.segments().collect();
    remove_rec(root, &segments);
}

fn remove_rec(node: &mut Value, segments: &[&str]) {
    let Some((first, rest)) = segments.split_first() else {
        return;
    };
    let Value::Object(map) = node else {
        return;
    };
    if rest.is_empty() {
        map.remove(*first);
        return;
    }
    if let Some(child) = map.get_mut(*first) {
        remove_rec(child, rest);
        if is_empty_node(child) {
            map.remove(*first);
        }
    }
}
