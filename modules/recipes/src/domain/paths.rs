use std::fmt;

use crate::config::RecipesConfig;
use crate::domain::ports::StoreError;

/// Characters the hosted store refuses inside a key.
const FORBIDDEN: &[char] = &['/', '.', '#', '$', '[', ']'];

/// Slash-separated location inside the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorePath(String);

impl StorePath {
    /// Parse a slash-separated path, validating every segment.
    pub fn parse(raw: &str) -> Result<Self, StoreError> {
        let trimmed = raw.trim_matches('/');
        if trimmed.is_empty() {
            return Err(StoreError::InvalidPath(raw.to_string()));
        }
        for segment in trimmed.split('/') {
            validate_segment(segment).map_err(|_| StoreError::InvalidPath(raw.to_string()))?;
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Append a single key.
    pub fn child(&self, key: &str) -> Result<Self, StoreError> {
        validate_segment(key)?;
        Ok(Self(format!("{}/{}", self.0, key)))
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// Last segment, i.e. the record key.
    pub fn key(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when `self` equals `other` or lies above it.
    pub fn is_ancestor_or_self(&self, other: &StorePath) -> bool {
        other.0 == self.0
            || other
                .0
                .strip_prefix(&self.0)
                .is_some_and(|rest| rest.starts_with('/'))
    }

    /// True when one path contains the other.
    pub fn overlaps(&self, other: &StorePath) -> bool {
        self.is_ancestor_or_self(other) || other.is_ancestor_or_self(self)
    }
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn validate_segment(segment: &str) -> Result<(), StoreError> {
    if segment.is_empty() || segment.contains(FORBIDDEN) {
        return Err(StoreError::InvalidPath(segment.to_string()));
    }
    Ok(())
}

/// Collection roots resolved from configuration.
#[derive(Debug, Clone)]
pub struct StoreLayout {
    recipes: StorePath,
    favorites: StorePath,
    users: StorePath,
}

impl StoreLayout {
    pub fn from_config(cfg: &RecipesConfig) -> Result<Self, StoreError> {
        Ok(Self {
            recipes: StorePath::parse(&cfg.recipes_path)?,
            favorites: StorePath::parse(&cfg.favorites_path)?,
            users: StorePath::parse(&cfg.users_path)?,
        })
    }

    /// `recipes`
    pub fn recipes(&self) -> &StorePath {
        &self.recipes
    }

    /// `recipes/{id}`
    pub fn recipe(&self, id: &str) -> Result<StorePath, StoreError> {
        self.recipes.child(id)
    }

    /// `userFavorites/{uid}`
    pub fn user_favorites(&self, uid: &str) -> Result<StorePath, StoreError> {
        self.favorites.child(uid)
    }

    /// `userFavorites/{uid}/{recipeId}`
    pub fn favorite(&self, uid: &str, recipe_id: &str) -> Result<StorePath, StoreError> {
        self.favorites.child(uid)?.child(recipe_id)
    }

    /// `users/{uid}`
    pub fn user(&self, uid: &str) -> Result<StorePath, StoreError> {
        self.users.child(uid)
    }
}

impl Default for StoreLayout {
    fn default() -> Self {
        Self {
            recipes: StorePath("recipes".into()),
            favorites: StorePath("userFavorites".into()),
            users: StorePath("users".into()),
        }
    }
}
