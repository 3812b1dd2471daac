//! Shared state of the screens that show one recipe with its favorite flag.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::contract::model::Recipe;
use crate::domain::error::DomainError;
use crate::domain::service::Service;
use crate::state::cell::{Observable, Producer};
use crate::state::scope::{Scope, WatchSlot, WriteQueue};

pub(crate) struct RecipeCells {
    pub(crate) recipe: Producer<Option<Recipe>>,
    /// `None` until the first favorite snapshot arrives.
    pub(crate) is_favorite: Producer<Option<bool>>,
    pub(crate) is_loading: Producer<bool>,
    pub(crate) error: Producer<Option<String>>,
    /// Bumped by every toggle and every new watch; a failed write only
    /// reverts the flag when nothing newer has touched it.
    generation: AtomicU64,
}

impl RecipeCells {
    pub(crate) fn new() -> Self {
        Self {
            recipe: Producer::new(None),
            is_favorite: Producer::new(None),
            is_loading: Producer::new(false),
            error: Producer::new(None),
            generation: AtomicU64::new(0),
        }
    }
}

/// A recipe, its live favorite flag and the loading sequence around them.
pub(crate) struct RecipeView {
    pub(crate) service: Arc<Service>,
    pub(crate) cells: Arc<RecipeCells>,
    pub(crate) favorite: WatchSlot,
    writes: WriteQueue,
    pub(crate) scope: Scope,
}

impl RecipeView {
    pub(crate) fn new(service: Arc<Service>) -> Self {
        let scope = Scope::new();
        Self {
            service,
            cells: Arc::new(RecipeCells::new()),
            favorite: scope.slot(),
            writes: scope.queue(),
            scope,
        }
    }

    pub(crate) fn recipe(&self) -> Observable<Option<Recipe>> {
        self.cells.recipe.observe()
    }

    pub(crate) fn is_favorite(&self) -> Observable<Option<bool>> {
        self.cells.is_favorite.observe()
    }

    pub(crate) fn is_loading(&self) -> Observable<bool> {
        self.cells.is_loading.observe()
    }

    pub(crate) fn error(&self) -> Observable<Option<String>> {
        self.cells.error.observe()
    }

    /// Flip the cached favorite flag and queue the write. Writes land in toggle
    /// order; a failed one restores the flag unless a newer toggle or watch
    /// has superseded it.
    pub(crate) fn toggle_favorite(&self) -> Result<JoinHandle<()>, DomainError> {
        let recipe = self
            .cells
            .recipe
            .get()
            .ok_or_else(|| DomainError::validation("recipe", "No recipe loaded"))?;
        let current = self
            .cells
            .is_favorite
            .get()
            .ok_or(DomainError::FavoriteStateUnknown)?;
        let wanted = !current;
        let generation = self.cells.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.cells.is_favorite.set(Some(wanted));

        let service = self.service.clone();
        let cells = self.cells.clone();
        Ok(self.writes.push(async move {
            if let Err(e) = service.set_favorite(&recipe.id, wanted).await {
                cells.error.set(Some(e.to_string()));
                if cells.generation.load(Ordering::SeqCst) == generation {
                    warn!(recipe_id = %recipe.id, error = %e, "Favorite write failed, reverting");
                    cells.is_favorite.set(Some(current));
                } else {
                    warn!(recipe_id = %recipe.id, error = %e, "Favorite write failed after a newer toggle");
                }
            }
        }))
    }
}

/// Start following the favorite flag of `recipe_id`, releasing any previous watch.
pub(crate) fn watch_favorite(
    service: &Service,
    cells: &Arc<RecipeCells>,
    slot: &WatchSlot,
    recipe_id: &str,
) {
    clear_favorite(cells, slot);
    match service.watch_favorite(recipe_id) {
        Ok(mut watch) => {
            let cells = cells.clone();
            slot.replace(async move {
                while let Some(flag) = watch.next().await {
                    debug!(recipe_id = %watch.recipe_id(), flag, "Favorite flag observed");
                    cells.is_favorite.set(Some(flag));
                }
            });
        }
        Err(e) => {
            cells.error.set(Some(e.to_string()));
        }
    }
}

/// Stop following any favorite flag and forget the cached one.
pub(crate) fn clear_favorite(cells: &RecipeCells, slot: &WatchSlot) {
    slot.clear();
    cells.generation.fetch_add(1, Ordering::SeqCst);
    cells.is_favorite.set(None);
}
