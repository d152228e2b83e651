//! Infrastructure layer for rowhook.
//!
//! Contains implementations of the port traits defined in `rowhook-core`:
//! the Baserow HTTP client, SQLite-backed trigger state, and the
//! configuration and data directory loaders.

pub mod baserow;
pub mod config;
pub mod filesystem;
pub mod sqlite;
