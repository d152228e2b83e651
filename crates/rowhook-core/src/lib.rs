//! Business logic and port trait definitions for rowhook.
//!
//! This crate defines the "ports" that the infrastructure layer implements
//! (table service API, option loading, key-value storage) and the two pieces
//! of logic built on them: the subscription lifecycle manager and the
//! inbound delivery classifier. It depends only on `rowhook-types` -- never
//! on `rowhook-infra` or any database/HTTP crate.

pub mod delivery;
pub mod lifecycle;
pub mod remote;
pub mod repository;
