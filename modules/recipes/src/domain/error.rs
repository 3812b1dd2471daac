use thiserror::Error;

use crate::domain::ports::{AuthError, StoreError};

/// Which user flow an auth failure happened in; selects the user-facing wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFlow {
    Login,
    Registration,
    Reauthentication,
}

/// Domain-specific errors using thiserror
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Malformed record '{key}': {message}")]
    ParseFailure { key: String, message: String },

    #[error("Recipe not found: {id}")]
    RecipeNotFound { id: String },

    #[error("{}", auth_failure_message(*flow, source))]
    Auth { flow: AuthFlow, source: AuthError },

    #[error("No user is signed in")]
    NotSignedIn,

    #[error("Favorite status is not known yet")]
    FavoriteStateUnknown,

    #[error("Validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Transport error: {message}")]
    Transport { message: String },
}

impl DomainError {
    pub fn parse_failure(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParseFailure {
            key: key.into(),
            message: message.into(),
        }
    }

    pub fn recipe_not_found(id: impl Into<String>) -> Self {
        Self::RecipeNotFound { id: id.into() }
    }

    pub fn auth(flow: AuthFlow, source: AuthError) -> Self {
        match source {
            AuthError::NotSignedIn => Self::NotSignedIn,
            source => Self::Auth { flow, source },
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

impl From<StoreError> for DomainError {
    fn from(e: StoreError) -> Self {
        Self::transport(e.to_string())
    }
}

/// User-facing message for an auth failure, by failure category.
pub fn auth_failure_message(flow: AuthFlow, err: &AuthError) -> String {
    match flow {
        AuthFlow::Registration => {
            let reason = match err {
                AuthError::WeakPassword => "Password is too weak".to_string(),
                AuthError::InvalidEmail | AuthError::InvalidCredentials => {
                    "Invalid email format".to_string()
                }
                AuthError::EmailInUse => "Email already in use".to_string(),
                other => other.to_string(),
            };
            format!("Registration failed: {reason}")
        }
        AuthFlow::Reauthentication => {
            let reason = match err {
                AuthError::InvalidCredentials => "current password is incorrect".to_string(),
                other => other.to_string(),
            };
            format!("Authentication failed: {reason}")
        }
        AuthFlow::Login => format!("Login failed: {err}"),
    }
}
