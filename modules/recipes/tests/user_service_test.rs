mod common;

use std::sync::Arc;

use serde_json::json;

use common::{module_over, EMAIL, PASSWORD};
use recipes::contract::model::{NewAccount, ProfilePatch};
use recipes::domain::error::DomainError;
use recipes::domain::paths::StoreLayout;
use recipes::domain::ports::IdentityProvider;
use recipes::domain::service::{Service, ServiceConfig};
use recipes::domain::user_service::UserRules;
use recipes::infra::memory::{MemoryIdentity, MemoryStore};

fn account(email: &str, password: &str) -> NewAccount {
    NewAccount {
        full_name: "Ana Cook".into(),
        email: email.into(),
        password: password.into(),
        phone: "555-0100".into(),
        address: "1 Main St".into(),
    }
}

#[tokio::test]
async fn register_writes_the_profile_document() {
    let store = MemoryStore::new();
    let (module, _) = module_over(Arc::new(store.clone()));
    let service = module.service();

    let principal = service.register(account(EMAIL, PASSWORD)).await.unwrap();
    assert_eq!(service.current_user(), Some(principal.clone()));

    let doc = store.dump()["users"][principal.uid.as_str()].clone();
    assert_eq!(
        doc,
        json!({
            "fullName": "Ana Cook",
            "email": EMAIL,
            "phone": "555-0100",
            "address": "1 Main St"
        })
    );
}

#[tokio::test]
async fn register_validates_before_calling_the_provider() {
    let (module, identity) = module_over(Arc::new(MemoryStore::new()));
    let service = module.service();

    let err = service.register(account("not-an-email", PASSWORD)).await.unwrap_err();
    assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "email"));

    let err = service.register(account(EMAIL, "123")).await.unwrap_err();
    assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "password"));

    let mut nameless = account(EMAIL, PASSWORD);
    nameless.full_name = "   ".into();
    assert!(service.register(nameless).await.is_err());

    let mut long_name = account(EMAIL, PASSWORD);
    long_name.full_name = "x".repeat(101);
    assert!(service.register(long_name).await.is_err());

    assert_eq!(identity.account_count(), 0);
}

#[tokio::test]
async fn provider_rejections_map_to_user_facing_messages() {
    let store = Arc::new(MemoryStore::new());
    let identity = Arc::new(MemoryIdentity::new());
    let config = ServiceConfig {
        layout: StoreLayout::default(),
        rules: UserRules {
            min_password_length: 1,
            max_full_name_length: 100,
        },
    };
    let service = Service::new(store, identity, config);

    let err = service.register(account(EMAIL, "abc")).await.unwrap_err();
    assert_eq!(err.to_string(), "Registration failed: Password is too weak");

    service.register(account(EMAIL, PASSWORD)).await.unwrap();
    let err = service.register(account(EMAIL, PASSWORD)).await.unwrap_err();
    assert_eq!(err.to_string(), "Registration failed: Email already in use");
}

#[tokio::test]
async fn failed_profile_write_is_reported() {
    let store = MemoryStore::new();
    let (module, identity) = module_over(Arc::new(store.clone()));
    store.set_offline(true);

    let err = module.service().register(account(EMAIL, PASSWORD)).await.unwrap_err();
    assert!(err.to_string().contains("Error saving user data"));
    // The account exists even though its profile document could not be written.
    assert_eq!(identity.account_count(), 1);
}

#[tokio::test]
async fn login_logout_round() {
    let (module, identity) = module_over(Arc::new(MemoryStore::new()));
    identity.register(EMAIL, PASSWORD).await.unwrap();
    let service = module.service();

    service.logout().await;
    assert_eq!(service.current_user(), None);
    assert_eq!(service.current_user_id().unwrap_err(), DomainError::NotSignedIn);

    let err = service.login(EMAIL, "").await.unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));

    let principal = service.login(EMAIL, PASSWORD).await.unwrap();
    assert_eq!(service.current_user_id().unwrap(), principal.uid);
}

#[tokio::test]
async fn profile_falls_back_to_the_principal_email() {
    let (module, identity) = module_over(Arc::new(MemoryStore::new()));
    identity.register(EMAIL, PASSWORD).await.unwrap();

    let profile = module.service().load_profile().await.unwrap();
    assert_eq!(profile.email, EMAIL);
    assert!(profile.full_name.is_empty());
}

#[tokio::test]
async fn update_profile_merges_changed_fields() {
    let store = MemoryStore::new();
    let (module, _) = module_over(Arc::new(store.clone()));
    let service = module.service();
    service.register(account(EMAIL, PASSWORD)).await.unwrap();

    let err = service.update_profile(ProfilePatch::default()).await.unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));

    let updated = service
        .update_profile(ProfilePatch {
            full_name: Some("Ana B. Cook".into()),
            address: Some("2 Side St".into()),
            ..ProfilePatch::default()
        })
        .await
        .unwrap();
    assert_eq!(updated.full_name, "Ana B. Cook");
    assert_eq!(updated.address, "2 Side St");
    assert_eq!(updated.phone, "555-0100");
    assert_eq!(updated.email, EMAIL);
}

#[tokio::test]
async fn change_password_reauthenticates_first() {
    let (module, identity) = module_over(Arc::new(MemoryStore::new()));
    let service = module.service();
    service.register(account(EMAIL, PASSWORD)).await.unwrap();

    let err = service.change_password("", "secret2").await.unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));

    let err = service.change_password("wrong-one", "secret2").await.unwrap_err();
    assert_eq!(err.to_string(), "Authentication failed: current password is incorrect");

    service.change_password(PASSWORD, "secret2").await.unwrap();
    identity.logout().await;
    assert!(identity.login(EMAIL, PASSWORD).await.is_err());
    assert!(identity.login(EMAIL, "secret2").await.is_ok());
}
