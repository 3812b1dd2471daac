use async_trait::async_trait;
use futures::StreamExt;
use std::sync::Arc;

use crate::contract::{
    client::RecipesApi,
    error::RecipesError,
    model::{NewAccount, Principal, ProfilePatch, Recipe, UserProfile},
};
use crate::domain::service::Service;

/// Local implementation of the RecipesApi trait that delegates to the domain service
pub struct RecipesLocalClient {
    service: Arc<Service>,
}

impl RecipesLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl RecipesApi for RecipesLocalClient {
    async fn list_recipes(&self) -> Vec<Recipe> {
        self.service.list_recipes().await
    }

    async fn get_recipe(&self, id: &str) -> Result<Recipe, RecipesError> {
        self.service.get_recipe(id).await.map_err(Into::into)
    }

    async fn random_recipe(&self) -> Option<Recipe> {
        self.service.random_recipe().await
    }

    async fn favorite_recipes(&self) -> Result<Vec<Recipe>, RecipesError> {
        let mut feed = self.service.favorite_recipes()?;
        Ok(feed.next().await.unwrap_or_default())
    }

    async fn set_favorite(&self, recipe_id: &str, is_favorite: bool) -> Result<(), RecipesError> {
        self.service
            .set_favorite(recipe_id, is_favorite)
            .await
            .map_err(Into::into)
    }

    async fn is_favorite(&self, recipe_id: &str) -> Result<bool, RecipesError> {
        self.service.is_favorite(recipe_id).await.map_err(Into::into)
    }

    async fn register(&self, account: NewAccount) -> Result<Principal, RecipesError> {
        self.service.register(account).await.map_err(Into::into)
    }

    async fn login(&self, email: &str, password: &str) -> Result<Principal, RecipesError> {
        self.service.login(email, password).await.map_err(Into::into)
    }

    async fn logout(&self) {
        self.service.logout().await
    }

    fn current_user(&self) -> Option<Principal> {
        self.service.current_user()
    }

    async fn profile(&self) -> Result<UserProfile, RecipesError> {
        self.service.load_profile().await.map_err(Into::into)
    }

    async fn update_profile(&self, patch: ProfilePatch) -> Result<UserProfile, RecipesError> {
        self.service.update_profile(patch).await.map_err(Into::into)
    }

    async fn change_password(&self, current: &str, new: &str) -> Result<(), RecipesError> {
        self.service
            .change_password(current, new)
            .await
            .map_err(Into::into)
    }
}
