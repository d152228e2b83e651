//! Shared domain types for rowhook.
//!
//! This crate contains the types shared across the rowhook workspace:
//! event kinds, table selectors, subscription state, inbound deliveries,
//! configuration, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde and thiserror.

pub mod config;
pub mod delivery;
pub mod error;
pub mod event;
pub mod subscription;
