use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::contract::model::Recipe;
use crate::domain::service::Service;
use crate::state::cell::{Observable, Producer};
use crate::state::scope::Scope;

struct Cells {
    recipes: Producer<Vec<Recipe>>,
    is_loading: Producer<bool>,
    error: Producer<Option<String>>,
}

/// Home list of all recipes.
pub struct DashboardScreen {
    service: Arc<Service>,
    cells: Arc<Cells>,
    scope: Scope,
}

impl DashboardScreen {
    pub fn new(service: Arc<Service>) -> Self {
        Self {
            service,
            cells: Arc::new(Cells {
                recipes: Producer::new(Vec::new()),
                is_loading: Producer::new(false),
                error: Producer::new(None),
            }),
            scope: Scope::new(),
        }
    }

    pub fn recipes(&self) -> Observable<Vec<Recipe>> {
        self.cells.recipes.observe()
    }

    pub fn is_loading(&self) -> Observable<bool> {
        self.cells.is_loading.observe()
    }

    pub fn error(&self) -> Observable<Option<String>> {
        self.cells.error.observe()
    }

    pub fn load(&self) -> JoinHandle<()> {
        self.cells.is_loading.set(true);
        let service = self.service.clone();
        let cells = self.cells.clone();
        self.scope.spawn(async move {
            let recipes = service.list_recipes().await;
            cells.error.set(recipes.is_empty().then(|| "No recipes available".to_string()));
            cells.recipes.set(recipes);
            cells.is_loading.set(false);
        })
    }
}
