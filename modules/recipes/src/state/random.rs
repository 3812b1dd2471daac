use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::contract::model::Recipe;
use crate::domain::error::DomainError;
use crate::domain::service::Service;
use crate::state::cell::Observable;
use crate::state::recipe_view::{clear_favorite, watch_favorite, RecipeView};

/// A random recipe with its favorite flag. Each new draw replaces the watched id.
pub struct RandomScreen {
    view: RecipeView,
}

impl RandomScreen {
    pub fn new(service: Arc<Service>) -> Self {
        Self {
            view: RecipeView::new(service),
        }
    }

    pub fn recipe(&self) -> Observable<Option<Recipe>> {
        self.view.recipe()
    }

    pub fn is_favorite(&self) -> Observable<Option<bool>> {
        self.view.is_favorite()
    }

    pub fn is_loading(&self) -> Observable<bool> {
        self.view.is_loading()
    }

    pub fn error(&self) -> Observable<Option<String>> {
        self.view.error()
    }

    pub fn load_random(&self) -> JoinHandle<()> {
        let cells = self.view.cells.clone();
        cells.is_loading.set(true);
        cells.error.set(None);

        let service = self.view.service.clone();
        let slot = self.view.favorite.clone();
        self.view.scope.spawn(async move {
            let drawn = service.random_recipe().await;
            let drawn_id = drawn.as_ref().map(|r| r.id.clone());
            cells.recipe.set(drawn);
            cells.is_loading.set(false);

            match drawn_id {
                Some(id) => {
                    debug!(recipe_id = %id, "Random recipe drawn");
                    watch_favorite(&service, &cells, &slot, &id);
                }
                None => {
                    clear_favorite(&cells, &slot);
                    cells.error.set(Some("No recipes available".to_string()));
                }
            }
        })
    }

    pub fn toggle_favorite(&self) -> Result<JoinHandle<()>, DomainError> {
        self.view.toggle_favorite()
    }
}
