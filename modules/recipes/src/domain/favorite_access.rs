use std::sync::Arc;

use futures::stream::{self, BoxStream, StreamExt};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::contract::model::Recipe;
use crate::domain::error::DomainError;
use crate::domain::paths::StoreLayout;
use crate::domain::ports::{RemoteStore, Snapshot, Subscription};
use crate::domain::recipe_access::RecipeAccess;

/// Membership truth: a record holding `true`. Missing records and explicit `false`
/// both read as "not a favorite".
pub(crate) fn is_flag_set(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::Bool(true)))
}

/// Recipe ids whose membership flag is set, in snapshot order.
pub(crate) fn favorite_ids(snapshot: &Snapshot) -> Vec<String> {
    match snapshot {
        Some(Value::Object(entries)) => entries
            .iter()
            .filter(|(_, flag)| is_flag_set(Some(flag)))
            .map(|(id, _)| id.clone())
            .collect(),
        _ => Vec::new(),
    }
}

/// Per-user favorite membership records under `userFavorites/{uid}/{recipeId}`.
#[derive(Clone)]
pub struct FavoriteAccess {
    store: Arc<dyn RemoteStore>,
    layout: StoreLayout,
    recipes: RecipeAccess,
}

impl FavoriteAccess {
    pub fn new(store: Arc<dyn RemoteStore>, layout: StoreLayout, recipes: RecipeAccess) -> Self {
        Self {
            store,
            layout,
            recipes,
        }
    }

    /// Live list of the user's favorite recipes.
    ///
    /// Each time the membership set changes, the flagged ids are collected and the
    /// recipe collection is read once to project them. A cancelled listener yields
    /// one empty list and ends the stream.
    #[instrument(name = "recipes.favorite_access.favorite_recipes", skip(self))]
    pub fn favorite_recipes(
        &self,
        uid: &str,
    ) -> Result<BoxStream<'static, Vec<Recipe>>, DomainError> {
        let sub = self.store.subscribe(&self.layout.user_favorites(uid)?)?;
        let recipes = self.recipes.clone();

        Ok(stream::unfold((sub, recipes), |(mut sub, recipes)| async move {
            let list = match sub.next().await? {
                Ok(snapshot) => {
                    let ids = favorite_ids(&snapshot);
                    debug!(count = ids.len(), "Favorite membership changed");
                    recipes.fetch_many(&ids).await
                }
                Err(e) => {
                    warn!(error = %e, "Favorite listener cancelled");
                    Vec::new()
                }
            };
            Some((list, (sub, recipes)))
        })
        .boxed())
    }

    /// `true` writes the membership flag; `false` deletes the record entirely.
    #[instrument(name = "recipes.favorite_access.set_favorite", skip(self))]
    pub async fn set_favorite(
        &self,
        uid: &str,
        recipe_id: &str,
        is_favorite: bool,
    ) -> Result<(), DomainError> {
        let path = self.layout.favorite(uid, recipe_id)?;
        if is_favorite {
            self.store.set(&path, Value::Bool(true)).await?;
        } else {
            self.store.remove(&path).await?;
        }
        info!("Favorite updated");
        Ok(())
    }

    /// One-shot membership check.
    #[instrument(name = "recipes.favorite_access.is_favorite", skip(self))]
    pub async fn is_favorite(&self, uid: &str, recipe_id: &str) -> Result<bool, DomainError> {
        let path = self.layout.favorite(uid, recipe_id)?;
        let snapshot = self.store.get(&path).await?;
        Ok(is_flag_set(snapshot.as_ref()))
    }

    /// Live membership flag for one recipe.
    #[instrument(name = "recipes.favorite_access.watch_favorite", skip(self))]
    pub fn watch_favorite(&self, uid: &str, recipe_id: &str) -> Result<FavoriteWatch, DomainError> {
        let path = self.layout.favorite(uid, recipe_id)?;
        let sub = self.store.subscribe(&path)?;
        Ok(FavoriteWatch {
            recipe_id: recipe_id.to_string(),
            sub,
        })
    }
}

/// Live favorite flag for a single recipe. Dropping it releases the listener.
#[derive(Debug)]
pub struct FavoriteWatch {
    recipe_id: String,
    sub: Subscription,
}

impl FavoriteWatch {
    pub fn recipe_id(&self) -> &str {
        &self.recipe_id
    }

    /// Current flag first, then every change. `None` once the listener ends.
    pub async fn next(&mut self) -> Option<bool> {
        match self.sub.next().await? {
            Ok(snapshot) => Some(is_flag_set(snapshot.as_ref())),
            Err(e) => {
                warn!(recipe_id = %self.recipe_id, error = %e, "Favorite listener cancelled");
                None
            }
        }
    }
}
