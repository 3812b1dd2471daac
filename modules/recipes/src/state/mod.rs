//! Per-screen observable state.
//!
//! Every screen owns the producers of its cells and hands out read-only
//! [`Observable`]s. Operations set `is_loading` before returning and run the
//! backend work on a task; the returned `JoinHandle` completes when the cells
//! hold the outcome. Live subscriptions belong to the screen and are released
//! when a new one replaces them or the screen is dropped.

pub mod account;
pub mod cell;
pub mod dashboard;
pub mod detail;
pub mod favorites;
pub mod random;
mod recipe_view;
mod scope;

pub use account::{LoginScreen, ProfileScreen, RegisterScreen};
pub use cell::{cell, Observable, Producer};
pub use dashboard::DashboardScreen;
pub use detail::DetailScreen;
pub use favorites::FavoritesScreen;
pub use random::RandomScreen;
