mod common;

use std::sync::Arc;

use serde_json::json;

use common::{module_over, sample_tree, EMAIL, PASSWORD};
use recipes::config::RecipesConfig;
use recipes::contract::client::RecipesApi;
use recipes::contract::error::RecipesError;
use recipes::contract::model::ProfilePatch;
use recipes::domain::error::{AuthFlow, DomainError};
use recipes::domain::ports::{AuthError, IdentityProvider, StoreError};
use recipes::infra::memory::MemoryStore;
use recipes::Recipes;

#[test]
fn config_defaults_and_overrides() {
    let cfg: RecipesConfig = serde_json::from_value(json!({})).unwrap();
    assert_eq!(cfg.recipes_path, "recipes");
    assert_eq!(cfg.favorites_path, "userFavorites");
    assert_eq!(cfg.users_path, "users");
    assert_eq!(cfg.min_password_length, 6);
    assert_eq!(cfg.max_full_name_length, 100);
    assert!(cfg.seed_file.is_none());

    let cfg: RecipesConfig =
        serde_json::from_value(json!({ "recipes_path": "catalog/recipes", "seed_file": "seed.json" }))
            .unwrap();
    assert_eq!(cfg.recipes_path, "catalog/recipes");
    assert_eq!(cfg.seed_file.as_deref(), Some("seed.json"));
}

#[test]
fn config_rejects_unknown_fields() {
    let result: Result<RecipesConfig, _> = serde_json::from_value(json!({ "page_size": 10 }));
    assert!(result.is_err());
}

#[test]
fn invalid_layout_is_rejected_at_wiring() {
    let cfg = RecipesConfig {
        favorites_path: "user$Favorites".into(),
        ..RecipesConfig::default()
    };
    let store = Arc::new(MemoryStore::new());
    let identity = Arc::new(recipes::infra::memory::MemoryIdentity::new());
    assert!(Recipes::new(&cfg, store, identity).is_err());
}

#[test]
fn domain_errors_map_to_contract_errors() {
    let cases = [
        (DomainError::recipe_not_found("r9"), RecipesError::not_found("r9")),
        (DomainError::NotSignedIn, RecipesError::Unauthenticated),
        (
            DomainError::auth(AuthFlow::Registration, AuthError::EmailInUse),
            RecipesError::auth("Registration failed: Email already in use"),
        ),
        (
            DomainError::validation("email", "Invalid email: x"),
            RecipesError::validation("email: Invalid email: x"),
        ),
        (
            DomainError::from(StoreError::Unavailable("down".into())),
            RecipesError::Unavailable,
        ),
        (DomainError::parse_failure("r1", "bad"), RecipesError::Internal),
    ];
    for (domain, expected) in cases {
        assert_eq!(RecipesError::from(domain), expected);
    }
}

#[tokio::test]
async fn local_client_serves_the_contract() {
    let store = MemoryStore::with_data(sample_tree());
    let (module, identity) = module_over(Arc::new(store));
    let client = module.client();

    assert_eq!(client.list_recipes().await.len(), 3);
    assert_eq!(client.get_recipe("r2").await.unwrap().title, "Pancakes");
    assert_eq!(
        client.get_recipe("zzz").await.unwrap_err(),
        RecipesError::not_found("zzz")
    );
    assert!(client.random_recipe().await.is_some());

    assert_eq!(
        client.set_favorite("r1", true).await.unwrap_err(),
        RecipesError::Unauthenticated
    );
    identity.register(EMAIL, PASSWORD).await.unwrap();
    assert_eq!(client.current_user().unwrap().email, EMAIL);

    client.set_favorite("r1", true).await.unwrap();
    assert!(client.is_favorite("r1").await.unwrap());
    let favorites = client.favorite_recipes().await.unwrap();
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0].id, "r1");

    let profile = client
        .update_profile(ProfilePatch {
            phone: Some("555-0199".into()),
            ..ProfilePatch::default()
        })
        .await
        .unwrap();
    assert_eq!(profile.phone, "555-0199");

    client.logout().await;
    assert!(client.current_user().is_none());
    assert_eq!(client.profile().await.unwrap_err(), RecipesError::Unauthenticated);
}

#[tokio::test]
async fn in_memory_wiring_loads_the_seed_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("seed.json"),
        serde_json::to_string(&sample_tree()).unwrap(),
    )
    .unwrap();

    let cfg = RecipesConfig {
        seed_file: Some("seed.json".into()),
        ..RecipesConfig::default()
    };
    let (module, backends) = Recipes::in_memory(&cfg, Some(dir.path())).await.unwrap();

    assert_eq!(module.service().list_recipes().await.len(), 3);
    assert_eq!(backends.identity.account_count(), 0);
    assert!(backends.store.dump()["recipes"]["broken"].is_object());
}

#[tokio::test]
async fn in_memory_wiring_fails_on_missing_seed() {
    let cfg = RecipesConfig {
        seed_file: Some("/no/such/seed.json".into()),
        ..RecipesConfig::default()
    };
    assert!(Recipes::in_memory(&cfg, None).await.is_err());
}
