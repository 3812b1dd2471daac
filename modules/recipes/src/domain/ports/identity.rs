use async_trait::async_trait;
use thiserror::Error;

use crate::contract::model::Principal;

/// Failure categories reported by the identity provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("the password is invalid or the user does not exist")]
    InvalidCredentials,

    #[error("the email address is badly formatted")]
    InvalidEmail,

    #[error("the given password is too weak")]
    WeakPassword,

    #[error("the email address is already in use by another account")]
    EmailInUse,

    #[error("no user is signed in")]
    NotSignedIn,

    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Port for the email/password identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an account and sign it in.
    async fn register(&self, email: &str, password: &str) -> Result<Principal, AuthError>;
    async fn login(&self, email: &str, password: &str) -> Result<Principal, AuthError>;
    async fn logout(&self);
    fn current_principal(&self) -> Option<Principal>;
    /// Confirm the signed-in user's current credential.
    async fn reauthenticate(&self, email: &str, password: &str) -> Result<(), AuthError>;
    /// Change the signed-in user's password. Callers re-authenticate first.
    async fn update_password(&self, new_password: &str) -> Result<(), AuthError>;
}
