use thiserror::Error;

/// Errors that are safe to expose to other crates
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecipesError {
    #[error("Recipe not found: {id}")]
    NotFound { id: String },

    #[error("Not signed in")]
    Unauthenticated,

    #[error("{message}")]
    Auth { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Backend unavailable")]
    Unavailable,

    #[error("Internal error")]
    Internal,
}

impl RecipesError {
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

impl From<crate::domain::error::DomainError> for RecipesError {
    fn from(domain_error: crate::domain::error::DomainError) -> Self {
        use crate::domain::error::DomainError::*;
        match domain_error {
            RecipeNotFound { id } => Self::not_found(id),
            e @ Auth { .. } => Self::auth(e.to_string()),
            NotSignedIn => Self::Unauthenticated,
            FavoriteStateUnknown => Self::validation("Favorite status is not known yet"),
            Validation { field, message } => Self::validation(format!("{}: {}", field, message)),
            Transport { .. } => Self::Unavailable,
            ParseFailure { .. } => Self::Internal,
        }
    }
}
