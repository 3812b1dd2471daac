//! In-process backends behind the store and identity ports.

pub mod identity;
pub mod store;

pub use identity::MemoryIdentity;
pub use store::MemoryStore;
