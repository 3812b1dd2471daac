use std::sync::Arc;

use futures::stream::BoxStream;
use tracing::{debug, instrument};

use crate::config::RecipesConfig;
use crate::contract::model::{NewAccount, Principal, ProfilePatch, Recipe, UserProfile};
use crate::domain::error::DomainError;
use crate::domain::favorite_access::{FavoriteAccess, FavoriteWatch};
use crate::domain::paths::StoreLayout;
use crate::domain::ports::{IdentityProvider, RemoteStore};
use crate::domain::recipe_access::RecipeAccess;
use crate::domain::user_service::{UserRules, UserService};

/// Configuration for the domain service
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    pub layout: StoreLayout,
    pub rules: UserRules,
}

impl ServiceConfig {
    pub fn from_module_config(cfg: &RecipesConfig) -> Result<Self, DomainError> {
        Ok(Self {
            layout: StoreLayout::from_config(cfg)?,
            rules: UserRules {
                min_password_length: cfg.min_password_length,
                max_full_name_length: cfg.max_full_name_length,
            },
        })
    }
}

/// Synchronization layer: recipe reads, favorites of the signed-in user and
/// account operations over explicitly injected backend handles.
#[derive(Clone)]
pub struct Service {
    recipes: RecipeAccess,
    favorites: FavoriteAccess,
    users: UserService,
}

impl Service {
    pub fn new(
        store: Arc<dyn RemoteStore>,
        identity: Arc<dyn IdentityProvider>,
        config: ServiceConfig,
    ) -> Self {
        let recipes = RecipeAccess::new(store.clone(), config.layout.clone());
        let favorites = FavoriteAccess::new(store.clone(), config.layout.clone(), recipes.clone());
        let users = UserService::new(identity, store, config.layout, config.rules);
        Self {
            recipes,
            favorites,
            users,
        }
    }

    pub fn recipe_access(&self) -> &RecipeAccess {
        &self.recipes
    }

    pub fn favorite_access(&self) -> &FavoriteAccess {
        &self.favorites
    }

    pub fn users(&self) -> &UserService {
        &self.users
    }

    // --- recipes ---

    pub async fn list_recipes(&self) -> Vec<Recipe> {
        self.recipes.fetch_all().await
    }

    pub async fn find_recipe(&self, id: &str) -> Option<Recipe> {
        self.recipes.fetch_one(id).await
    }

    /// Single recipe with its failure category.
    #[instrument(name = "recipes.service.get_recipe", skip(self))]
    pub async fn get_recipe(&self, id: &str) -> Result<Recipe, DomainError> {
        let recipe = self.recipes.try_fetch_one(id).await?;
        debug!("Successfully retrieved recipe");
        Ok(recipe)
    }

    pub async fn random_recipe(&self) -> Option<Recipe> {
        self.recipes.fetch_random().await
    }

    // --- favorites of the signed-in user ---

    pub fn current_user_id(&self) -> Result<String, DomainError> {
        Ok(self.users.require_user()?.uid)
    }

    /// Live favorites list of the signed-in user.
    pub fn favorite_recipes(&self) -> Result<BoxStream<'static, Vec<Recipe>>, DomainError> {
        self.favorites.favorite_recipes(&self.current_user_id()?)
    }

    pub async fn set_favorite(&self, recipe_id: &str, is_favorite: bool) -> Result<(), DomainError> {
        let uid = self.current_user_id()?;
        self.favorites.set_favorite(&uid, recipe_id, is_favorite).await
    }

    pub async fn is_favorite(&self, recipe_id: &str) -> Result<bool, DomainError> {
        let uid = self.current_user_id()?;
        self.favorites.is_favorite(&uid, recipe_id).await
    }

    pub fn watch_favorite(&self, recipe_id: &str) -> Result<FavoriteWatch, DomainError> {
        let uid = self.current_user_id()?;
        self.favorites.watch_favorite(&uid, recipe_id)
    }

    // --- account ---

    pub async fn register(&self, account: NewAccount) -> Result<Principal, DomainError> {
        self.users.register(account).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Principal, DomainError> {
        self.users.login(email, password).await
    }

    pub async fn logout(&self) {
        self.users.logout().await
    }

    pub fn current_user(&self) -> Option<Principal> {
        self.users.current_user()
    }

    pub async fn load_profile(&self) -> Result<UserProfile, DomainError> {
        self.users.load_profile().await
    }

    pub async fn update_profile(&self, patch: ProfilePatch) -> Result<UserProfile, DomainError> {
        self.users.update_profile(patch).await
    }

    pub async fn change_password(&self, current: &str, new: &str) -> Result<(), DomainError> {
        self.users.change_password(current, new).await
    }
}
