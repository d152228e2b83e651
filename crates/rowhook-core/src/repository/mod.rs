//! Storage abstractions for rowhook.
//!
//! Implementations live in rowhook-infra.

pub mod kv_store;
