use std::sync::Arc;

use rand::Rng;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::contract::model::Recipe;
use crate::domain::error::DomainError;
use crate::domain::paths::StoreLayout;
use crate::domain::ports::RemoteStore;

/// Reads of the recipe collection. Every record is keyed by its storage key.
#[derive(Clone)]
pub struct RecipeAccess {
    store: Arc<dyn RemoteStore>,
    layout: StoreLayout,
}

impl RecipeAccess {
    pub fn new(store: Arc<dyn RemoteStore>, layout: StoreLayout) -> Self {
        Self { store, layout }
    }

    /// All well-formed recipes. Malformed children are skipped; a failed read
    /// yields an empty list.
    #[instrument(name = "recipes.recipe_access.fetch_all", skip(self))]
    pub async fn fetch_all(&self) -> Vec<Recipe> {
        match self.read_collection().await {
            Ok(collection) => parse_collection(collection),
            Err(e) => {
                warn!(error = %e, "Error loading recipes");
                Vec::new()
            }
        }
    }

    /// Single recipe by key; `None` when missing, malformed or unreadable.
    #[instrument(name = "recipes.recipe_access.fetch_one", skip(self), fields(recipe_id = %id))]
    pub async fn fetch_one(&self, id: &str) -> Option<Recipe> {
        match self.try_fetch_one(id).await {
            Ok(recipe) => Some(recipe),
            Err(DomainError::RecipeNotFound { .. }) => {
                debug!("Recipe does not exist");
                None
            }
            Err(e) => {
                warn!(error = %e, "Error loading recipe");
                None
            }
        }
    }

    /// Like [`fetch_one`](Self::fetch_one) but keeps the failure category.
    pub async fn try_fetch_one(&self, id: &str) -> Result<Recipe, DomainError> {
        let path = self.layout.recipe(id)?;
        let payload = self
            .store
            .get(&path)
            .await?
            .ok_or_else(|| DomainError::recipe_not_found(id))?;
        Recipe::from_payload(id, payload).map_err(|e| DomainError::parse_failure(id, e.to_string()))
    }

    /// Uniformly random recipe among the well-formed ones; `None` when there are none.
    #[instrument(name = "recipes.recipe_access.fetch_random", skip(self))]
    pub async fn fetch_random(&self) -> Option<Recipe> {
        let mut recipes = self.fetch_all().await;
        if recipes.is_empty() {
            debug!("No recipes to choose from");
            return None;
        }
        let index = rand::rng().random_range(0..recipes.len());
        Some(recipes.swap_remove(index))
    }

    /// Project the collection onto `ids`, keeping the requested order. Unknown and
    /// malformed ids are skipped; a failed read yields an empty list.
    #[instrument(name = "recipes.recipe_access.fetch_many", skip(self, ids), fields(count = ids.len()))]
    pub async fn fetch_many(&self, ids: &[String]) -> Vec<Recipe> {
        if ids.is_empty() {
            return Vec::new();
        }
        let collection = match self.read_collection().await {
            Ok(Value::Object(map)) => map,
            Ok(_) => return Vec::new(),
            Err(e) => {
                warn!(error = %e, "Error loading recipes for projection");
                return Vec::new();
            }
        };

        ids.iter()
            .filter_map(|id| {
                let payload = collection.get(id)?.clone();
                parse_child(id, payload)
            })
            .collect()
    }

    async fn read_collection(&self) -> Result<Value, DomainError> {
        Ok(self
            .store
            .get(self.layout.recipes())
            .await?
            .unwrap_or(Value::Null))
    }
}

fn parse_collection(collection: Value) -> Vec<Recipe> {
    match collection {
        Value::Object(children) => children
            .into_iter()
            .filter_map(|(key, payload)| parse_child(&key, payload))
            .collect(),
        Value::Null => Vec::new(),
        other => {
            warn!(kind = %value_kind(&other), "Recipe collection is not a keyed collection");
            Vec::new()
        }
    }
}

fn parse_child(key: &str, payload: Value) -> Option<Recipe> {
    match Recipe::from_payload(key, payload) {
        Ok(recipe) => Some(recipe),
        Err(e) => {
            warn!(recipe_id = %key, error = %e, "Error parsing recipe");
            None
        }
    }
}

fn value_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
