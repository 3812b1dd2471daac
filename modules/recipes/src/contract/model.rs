use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A recipe as stored under the recipe collection.
///
/// `id` is the storage key of the record and is never part of the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    #[serde(skip)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default, alias = "calorias_totales")]
    pub calories: i64,
}

impl Recipe {
    /// Parse a stored payload and tag it with its storage key.
    pub fn from_payload(key: &str, payload: Value) -> Result<Self, serde_json::Error> {
        let mut recipe: Recipe = serde_json::from_value(payload)?;
        recipe.id = key.to_string();
        Ok(recipe)
    }
}

/// One ingredient line, stored as a `[name, note, quantity]` triple.
///
/// The middle element is carried through untouched; quantities may be stored as
/// numbers or strings and are normalized to text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "IngredientRow", into = "IngredientRow")]
pub struct Ingredient {
    pub name: String,
    pub note: Value,
    pub quantity: String,
}

#[derive(Serialize, Deserialize)]
struct IngredientRow(String, Value, Value);

impl From<IngredientRow> for Ingredient {
    fn from(IngredientRow(name, note, quantity): IngredientRow) -> Self {
        let quantity = match quantity {
            Value::String(s) => s,
            Value::Null => String::new(),
            other => other.to_string(),
        };
        Self {
            name,
            note,
            quantity,
        }
    }
}

impl From<Ingredient> for IngredientRow {
    fn from(i: Ingredient) -> Self {
        IngredientRow(i.name, i.note, Value::String(i.quantity))
    }
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.quantity.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{} ({})", self.name, self.quantity)
        }
    }
}

/// Signed-in principal issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub uid: String,
    pub email: String,
}

/// Profile document stored under `users/{uid}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
}

/// Data for registering a new account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub address: String,
}

/// Partial profile update; only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePatch {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.address.is_none()
    }

    /// Changed fields keyed by their stored names.
    pub fn to_fields(&self) -> serde_json::Map<String, Value> {
        [
            ("fullName", &self.full_name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("address", &self.address),
        ]
        .into_iter()
        .filter_map(|(k, v)| v.as_ref().map(|v| (k.to_string(), Value::String(v.clone()))))
        .collect()
    }
}
