use std::sync::Arc;

use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::contract::model::Recipe;
use crate::domain::service::Service;
use crate::state::cell::{Observable, Producer};
use crate::state::scope::{Scope, WatchSlot, WriteQueue};

struct Cells {
    recipes: Producer<Vec<Recipe>>,
    is_favorite: Producer<Option<bool>>,
    is_loading: Producer<bool>,
    error: Producer<Option<String>>,
}

/// Live list of the signed-in user's favorites.
pub struct FavoritesScreen {
    service: Arc<Service>,
    cells: Arc<Cells>,
    feed: WatchSlot,
    check: WatchSlot,
    writes: WriteQueue,
    _scope: Scope,
}

impl FavoritesScreen {
    pub fn new(service: Arc<Service>) -> Self {
        let scope = Scope::new();
        Self {
            service,
            cells: Arc::new(Cells {
                recipes: Producer::new(Vec::new()),
                is_favorite: Producer::new(None),
                is_loading: Producer::new(false),
                error: Producer::new(None),
            }),
            feed: scope.slot(),
            check: scope.slot(),
            writes: scope.queue(),
            _scope: scope,
        }
    }

    pub fn recipes(&self) -> Observable<Vec<Recipe>> {
        self.cells.recipes.observe()
    }

    /// Flag of the recipe last passed to `check_is_favorite`.
    pub fn is_favorite(&self) -> Observable<Option<bool>> {
        self.cells.is_favorite.observe()
    }

    /// True from `open` until the feed's first list arrives.
    pub fn is_loading(&self) -> Observable<bool> {
        self.cells.is_loading.observe()
    }

    pub fn error(&self) -> Observable<Option<String>> {
        self.cells.error.observe()
    }

    /// Start (or restart) the live favorites feed.
    pub fn open(&self) {
        match self.service.favorite_recipes() {
            Ok(mut feed) => {
                self.cells.error.set(None);
                self.cells.is_loading.set(true);
                let cells = self.cells.clone();
                self.feed.replace(async move {
                    while let Some(recipes) = feed.next().await {
                        debug!(count = recipes.len(), "Favorites refreshed");
                        cells.recipes.set(recipes);
                        cells.is_loading.set(false);
                    }
                    cells.is_loading.set(false);
                });
            }
            Err(e) => {
                self.feed.clear();
                self.cells.is_loading.set(false);
                self.cells.recipes.set(Vec::new());
                self.cells.error.set(Some(e.to_string()));
            }
        }
    }

    /// Writes from this screen land in call order.
    pub fn set_favorite(&self, recipe_id: &str, is_favorite: bool) -> JoinHandle<()> {
        let service = self.service.clone();
        let cells = self.cells.clone();
        let id = recipe_id.to_string();
        self.writes.push(async move {
            if let Err(e) = service.set_favorite(&id, is_favorite).await {
                warn!(recipe_id = %id, error = %e, "Favorite write failed");
                cells.error.set(Some(e.to_string()));
            }
        })
    }

    /// Follow the favorite flag of one recipe in `is_favorite`.
    pub fn check_is_favorite(&self, recipe_id: &str) {
        self.check.clear();
        self.cells.is_favorite.set(None);
        match self.service.watch_favorite(recipe_id) {
            Ok(mut watch) => {
                let cells = self.cells.clone();
                self.check.replace(async move {
                    while let Some(flag) = watch.next().await {
                        cells.is_favorite.set(Some(flag));
                    }
                });
            }
            Err(e) => {
                self.cells.error.set(Some(e.to_string()));
            }
        }
    }
}
