// === PUBLIC CONTRACT ===
pub mod contract;

pub use contract::{client, error, model};

// === WIRING ===
pub mod module;
pub use module::Recipes;

// === SCREENS ===
// Observable state holders consumed by presentation.
pub mod state;

// === INTERNAL MODULES ===
// Exposed for testing and for wiring alternative backends; other crates should
// depend on `contract` and `state`.
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod gateways;
pub mod infra;
