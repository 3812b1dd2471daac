use async_trait::async_trait;

use crate::contract::{
    error::RecipesError,
    model::{NewAccount, Principal, ProfilePatch, Recipe, UserProfile},
};

/// Public API of the recipes module for other crates
#[async_trait]
pub trait RecipesApi: Send + Sync {
    /// All well-formed recipes; empty when the backend cannot be read
    async fn list_recipes(&self) -> Vec<Recipe>;

    /// Get a recipe by its storage key
    async fn get_recipe(&self, id: &str) -> Result<Recipe, RecipesError>;

    /// A uniformly random recipe, `None` when the collection is empty
    async fn random_recipe(&self) -> Option<Recipe>;

    /// Current favorites of the signed-in user (one-shot)
    async fn favorite_recipes(&self) -> Result<Vec<Recipe>, RecipesError>;

    /// Mark or unmark a recipe as favorite for the signed-in user
    async fn set_favorite(&self, recipe_id: &str, is_favorite: bool) -> Result<(), RecipesError>;

    async fn is_favorite(&self, recipe_id: &str) -> Result<bool, RecipesError>;

    async fn register(&self, account: NewAccount) -> Result<Principal, RecipesError>;

    async fn login(&self, email: &str, password: &str) -> Result<Principal, RecipesError>;

    async fn logout(&self);

    fn current_user(&self) -> Option<Principal>;

    async fn profile(&self) -> Result<UserProfile, RecipesError>;

    async fn update_profile(&self, patch: ProfilePatch) -> Result<UserProfile, RecipesError>;

    /// Re-authenticates with `current` before changing the password
    async fn change_password(&self, current: &str, new: &str) -> Result<(), RecipesError>;
}
