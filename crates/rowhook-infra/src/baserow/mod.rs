//! Baserow REST API client.
//!
//! Implements `SubscriptionApi` (database webhooks) and `ResourceLoader`
//! (applications and tables) from `rowhook-core`.

pub mod client;
pub mod types;

pub use client::BaserowClient;
