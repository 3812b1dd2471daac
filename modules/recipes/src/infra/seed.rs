//! Seed documents for the in-memory store.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::Value;
use tracing::info;

use crate::domain::paths::StorePath;
use crate::domain::ports::RemoteStore;

/// Write every top-level entry of `doc` (e.g. `{ "recipes": { ... } }`) to the store.
/// Returns the number of top-level entries written.
pub async fn apply_seed(store: &dyn RemoteStore, doc: Value) -> Result<usize> {
    let Value::Object(entries) = doc else {
        bail!("seed document must be a JSON object keyed by collection");
    };

    let mut written = 0;
    for (key, value) in entries {
        let path = StorePath::parse(&key).with_context(|| format!("invalid seed key '{key}'"))?;
        store
            .set(&path, value)
            .await
            .with_context(|| format!("failed to write seed collection '{key}'"))?;
        written += 1;
    }
    Ok(written)
}

/// Read a JSON seed file and write it to the store.
pub async fn load_seed_file(store: &dyn RemoteStore, path: &Path) -> Result<usize> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read seed file {}", path.display()))?;
    let doc: Value = serde_json::from_str(&raw)
        .with_context(|| format!("seed file {} is not valid JSON", path.display()))?;
    let written = apply_seed(store, doc).await?;
    info!(path = %path.display(), collections = written, "Seed data loaded");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::memory::MemoryStore;
    use serde_json::json;
    use std::io::Write;

    #[tokio::test]
    async fn loads_collections_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "recipes": {{ "r1": {{ "title": "Soup", "calories": 120 }} }} }}"#
        )
        .unwrap();

        let store = MemoryStore::new();
        let written = load_seed_file(&store, file.path()).await.unwrap();
        assert_eq!(written, 1);
        assert_eq!(
            store.dump(),
            json!({ "recipes": { "r1": { "title": "Soup", "calories": 120 } } })
        );
    }

    #[tokio::test]
    async fn rejects_non_object_documents() {
        let store = MemoryStore::new();
        let err = apply_seed(&store, json!([1, 2, 3])).await.unwrap_err();
        assert!(err.to_string().contains("must be a JSON object"));
    }

    #[tokio::test]
    async fn missing_file_is_reported_with_path() {
        let store = MemoryStore::new();
        let err = load_seed_file(&store, Path::new("/definitely/not/here.json"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("failed to read seed file"));
    }
}
