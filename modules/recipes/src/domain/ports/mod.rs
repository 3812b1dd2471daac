pub mod identity;
pub mod store;

pub use identity::{AuthError, IdentityProvider};
pub use store::{RemoteStore, Snapshot, StoreError, Subscription, SubscriptionEvent};
