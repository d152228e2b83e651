//! Webhook subscription lifecycle.
//!
//! `SubscriptionManager` keeps one trigger instance's durable
//! `SubscriptionState` consistent with the table service across repeated
//! activate/deactivate cycles. `callback` rejects callback URLs the service
//! could never reach.

pub mod callback;
pub mod manager;

pub use manager::{Activation, Registration, SubscriptionManager, UnregisterOutcome};
