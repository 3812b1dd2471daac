use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use tracing::debug;
use uuid::Uuid;

use crate::contract::model::Principal;
use crate::domain::ports::{AuthError, IdentityProvider};

const MIN_PASSWORD_LENGTH: usize = 6;

struct Account {
    uid: String,
    email: String,
    password_digest: Vec<u8>,
}

/// Email/password accounts kept in memory, with a single signed-in principal.
///
/// Applies the same acceptance rules as the hosted provider: a plausible email
/// address, passwords of at least six characters and unique emails.
#[derive(Default)]
pub struct MemoryIdentity {
    accounts: RwLock<HashMap<String, Account>>,
    current: RwLock<Option<Principal>>,
    offline: AtomicBool,
}

impl MemoryIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every remote call fails with `AuthError::Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn account_count(&self) -> usize {
        self.accounts.read().len()
    }

    fn ensure_online(&self) -> Result<(), AuthError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(AuthError::Unavailable("network error".to_string()));
        }
        Ok(())
    }

    fn verify(&self, email: &str, password: &str) -> Result<Principal, AuthError> {
        let accounts = self.accounts.read();
        let account = accounts
            .get(&normalize(email))
            .ok_or(AuthError::InvalidCredentials)?;
        if account.password_digest != digest(&account.uid, password) {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(Principal {
            uid: account.uid.clone(),
            email: account.email.clone(),
        })
    }
}

fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

fn digest(uid: &str, password: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(uid.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hasher.finalize().to_vec()
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.split('.').count() >= 2
                && domain.split('.').all(|part| !part.is_empty())
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentity {
    async fn register(&self, email: &str, password: &str) -> Result<Principal, AuthError> {
        self.ensure_online()?;
        if !looks_like_email(email) {
            return Err(AuthError::InvalidEmail);
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::WeakPassword);
        }

        let key = normalize(email);
        let principal = {
            let mut accounts = self.accounts.write();
            if accounts.contains_key(&key) {
                return Err(AuthError::EmailInUse);
            }
            let uid = Uuid::new_v4().simple().to_string();
            let account = Account {
                password_digest: digest(&uid, password),
                uid: uid.clone(),
                email: email.trim().to_string(),
            };
            let principal = Principal {
                uid,
                email: account.email.clone(),
            };
            accounts.insert(key, account);
            principal
        };

        debug!(uid = %principal.uid, "Account created");
        *self.current.write() = Some(principal.clone());
        Ok(principal)
    }

    async fn login(&self, email: &str, password: &str) -> Result<Principal, AuthError> {
        self.ensure_online()?;
        if !looks_like_email(email) {
            return Err(AuthError::InvalidEmail);
        }
        let principal = self.verify(email, password)?;
        *self.current.write() = Some(principal.clone());
        Ok(principal)
    }

    async fn logout(&self) {
        self.current.write().take();
    }

    fn current_principal(&self) -> Option<Principal> {
        self.current.read().clone()
    }

    async fn reauthenticate(&self, email: &str, password: &str) -> Result<(), AuthError> {
        self.ensure_online()?;
        let current = self.current_principal().ok_or(AuthError::NotSignedIn)?;
        let principal = self.verify(email, password)?;
        if principal.uid != current.uid {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(())
    }

    async fn update_password(&self, new_password: &str) -> Result<(), AuthError> {
        self.ensure_online()?;
        if new_password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::WeakPassword);
        }
        let current = self.current_principal().ok_or(AuthError::NotSignedIn)?;
        let mut accounts = self.accounts.write();
        let account = accounts
            .get_mut(&normalize(&current.email))
            .ok_or(AuthError::NotSignedIn)?;
        account.password_digest = digest(&account.uid, new_password);
        Ok(())
    }
}
