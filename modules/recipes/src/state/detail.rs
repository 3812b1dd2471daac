use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::contract::model::Recipe;
use crate::domain::error::DomainError;
use crate::domain::service::Service;
use crate::state::cell::Observable;
use crate::state::recipe_view::{clear_favorite, watch_favorite, RecipeView};

/// Recipe detail: the recipe first, then its live favorite flag.
pub struct DetailScreen {
    view: RecipeView,
}

impl DetailScreen {
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

    /// Loading turns true before this returns and false once the recipe (or its
    /// absence) is published. The favorite watch starts only after that.
    pub fn load_recipe(&self, recipe_id: &str) -> JoinHandle<()> {
        let cells = self.view.cells.clone();
        cells.is_loading.set(true);
        cells.error.set(None);

        let id = recipe_id.to_string();
        let service = self.view.service.clone();
        let slot = self.view.favorite.clone();
        self.view.scope.spawn(async move {
            let found = match service.get_recipe(&id).await {
                Ok(recipe) => {
                    cells.recipe.set(Some(recipe));
                    true
                }
                Err(e) => {
                    cells.recipe.set(None);
                    cells.error.set(Some(e.to_string()));
                    false
                }
            };
            cells.is_loading.set(false);

            if found {
                watch_favorite(&service, &cells, &slot, &id);
            } else {
                clear_favorite(&cells, &slot);
            }
        })
    }

    pub fn toggle_favorite(&self) -> Result<JoinHandle<()>, DomainError> {
        self.view.toggle_favorite()
    }
}
