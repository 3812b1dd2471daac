use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::contract::model::{NewAccount, Principal, ProfilePatch, UserProfile};
use crate::domain::error::{AuthFlow, DomainError};
use crate::domain::paths::StoreLayout;
use crate::domain::ports::{IdentityProvider, RemoteStore};

/// Validation limits for account and profile input.
#[derive(Debug, Clone)]
pub struct UserRules {
    pub min_password_length: usize,
    pub max_full_name_length: usize,
}

impl Default for UserRules {
    fn default() -> Self {
        Self {
            min_password_length: 6,
            max_full_name_length: 100,
        }
    }
}

/// Authentication and profile documents under `users/{uid}`.
#[derive(Clone)]
pub struct UserService {
    identity: Arc<dyn IdentityProvider>,
    store: Arc<dyn RemoteStore>,
    layout: StoreLayout,
    rules: UserRules,
}

impl UserService {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        store: Arc<dyn RemoteStore>,
        layout: StoreLayout,
        rules: UserRules,
    ) -> Self {
        Self {
            identity,
            store,
            layout,
            rules,
        }
    }

    pub fn current_user(&self) -> Option<Principal> {
        self.identity.current_principal()
    }

    pub fn require_user(&self) -> Result<Principal, DomainError> {
        self.current_user().ok_or(DomainError::NotSignedIn)
    }

    /// Create the account, then write its profile document.
    #[instrument(
        name = "recipes.user_service.register",
        skip(self, account),
        fields(email = %account.email)
    )]
    pub async fn register(&self, account: NewAccount) -> Result<Principal, DomainError> {
        info!("Registering new account");
        self.validate_email(&account.email)?;
        self.validate_full_name(&account.full_name)?;
        self.validate_password(&account.password)?;

        let principal = self
            .identity
            .register(&account.email, &account.password)
            .await
            .map_err(|e| DomainError::auth(AuthFlow::Registration, e))?;

        let profile = UserProfile {
            full_name: account.full_name,
            email: account.email,
            phone: account.phone,
            address: account.address,
        };
        let doc = serde_json::to_value(&profile)
            .map_err(|e| DomainError::transport(format!("cannot encode profile: {e}")))?;
        self.store
            .set(&self.layout.user(&principal.uid)?, doc)
            .await
            .map_err(|e| DomainError::transport(format!("Error saving user data: {e}")))?;

        info!(uid = %principal.uid, "Account registered");
        Ok(principal)
    }

    #[instrument(name = "recipes.user_service.login", skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<Principal, DomainError> {
        self.validate_email(email)?;
        if password.is_empty() {
            return Err(DomainError::validation("password", "Password is required"));
        }
        let principal = self
            .identity
            .login(email, password)
            .await
            .map_err(|e| DomainError::auth(AuthFlow::Login, e))?;
        info!(uid = %principal.uid, "Signed in");
        Ok(principal)
    }

    #[instrument(name = "recipes.user_service.logout", skip(self))]
    pub async fn logout(&self) {
        self.identity.logout().await;
        info!("Signed out");
    }

    /// Profile of the signed-in user; an empty profile when no document exists yet.
    #[instrument(name = "recipes.user_service.load_profile", skip(self))]
    pub async fn load_profile(&self) -> Result<UserProfile, DomainError> {
        let user = self.require_user()?;
        match self.store.get(&self.layout.user(&user.uid)?).await? {
            Some(doc) => serde_json::from_value(doc)
                .map_err(|e| DomainError::parse_failure(user.uid, e.to_string())),
            None => {
                debug!("No profile document, using principal email");
                Ok(UserProfile {
                    email: user.email,
                    ..UserProfile::default()
                })
            }
        }
    }

    /// Merge the changed fields into the profile document.
    #[instrument(name = "recipes.user_service.update_profile", skip(self, patch))]
    pub async fn update_profile(&self, patch: ProfilePatch) -> Result<UserProfile, DomainError> {
        let user = self.require_user()?;
        if patch.is_empty() {
            return Err(DomainError::validation("profile", "Nothing to update"));
        }
        if let Some(name) = &patch.full_name {
            self.validate_full_name(name)?;
        }
        if let Some(email) = &patch.email {
            self.validate_email(email)?;
        }

        self.store
            .update(&self.layout.user(&user.uid)?, patch.to_fields())
            .await?;
        info!("Profile updated");
        self.load_profile().await
    }

    /// Re-authenticate with the current password, then set the new one.
    #[instrument(name = "recipes.user_service.change_password", skip_all)]
    pub async fn change_password(&self, current: &str, new: &str) -> Result<(), DomainError> {
        if current.is_empty() {
            return Err(DomainError::validation(
                "current_password",
                "Current password is required",
            ));
        }
        self.validate_password(new)?;
        let user = self.require_user()?;

        self.identity
            .reauthenticate(&user.email, current)
            .await
            .map_err(|e| DomainError::auth(AuthFlow::Reauthentication, e))?;
        self.identity.update_password(new).await.map_err(|e| {
            warn!(error = %e, "Password update rejected");
            DomainError::auth(AuthFlow::Reauthentication, e)
        })?;
        info!("Password changed");
        Ok(())
    }

    // --- validation helpers ---

    fn validate_email(&self, email: &str) -> Result<(), DomainError> {
        let valid = email
            .split_once('@')
            .is_some_and(|(local, domain)| {
                !local.is_empty()
                    && domain.contains('.')
                    && !domain.starts_with('.')
                    && !domain.ends_with('.')
            })
            && !email.contains(char::is_whitespace);
        if !valid {
            return Err(DomainError::validation("email", format!("Invalid email: {email}")));
        }
        Ok(())
    }

    fn validate_full_name(&self, name: &str) -> Result<(), DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::validation("full_name", "Full name is required"));
        }
        if name.chars().count() > self.rules.max_full_name_length {
            return Err(DomainError::validation(
                "full_name",
                format!(
                    "Full name too long (max: {} characters)",
                    self.rules.max_full_name_length
                ),
            ));
        }
        Ok(())
    }

    fn validate_password(&self, password: &str) -> Result<(), DomainError> {
        if password.chars().count() < self.rules.min_password_length {
            return Err(DomainError::validation(
                "password",
                format!(
                    "Password must be at least {} characters",
                    self.rules.min_password_length
                ),
            ));
        }
        Ok(())
    }
}
