pub mod error;
pub mod favorite_access;
pub mod paths;
pub mod ports;
pub mod recipe_access;
pub mod service;
pub mod user_service;
