use serde::{Deserialize, Serialize};

/// Configuration for the recipes module (`modules.recipes`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecipesConfig {
    /// Root of the recipe collection.
    #[serde(default = "default_recipes_path")]
    pub recipes_path: String,
    /// Root of the per-user favorite membership records.
    #[serde(default = "default_favorites_path")]
    pub favorites_path: String,
    /// Root of the profile documents.
    #[serde(default = "default_users_path")]
    pub users_path: String,
    /// JSON seed document loaded into the in-memory store at startup.
    #[serde(default)]
    pub seed_file: Option<String>,
    #[serde(default = "default_min_password_length")]
    pub min_password_length: usize,
    #[serde(default = "default_max_full_name_length")]
    pub max_full_name_length: usize,
}

impl Default for RecipesConfig {
    fn default() -> Self {
        Self {
            recipes_path: default_recipes_path(),
            favorites_path: default_favorites_path(),
            users_path: default_users_path(),
            seed_file: None,
            min_password_length: default_min_password_length(),
            max_full_name_length: default_max_full_name_length(),
        }
    }
}

fn default_recipes_path() -> String {
    "recipes".to_string()
}

fn default_favorites_path() -> String {
    "userFavorites".to_string()
}

fn default_users_path() -> String {
    "users".to_string()
}

fn default_min_password_length() -> usize {
    6
}

fn default_max_full_name_length() -> usize {
    100
}
