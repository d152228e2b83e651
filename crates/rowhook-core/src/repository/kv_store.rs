//! Key-value store trait.
//!
//! Defines the interface for trigger-scoped durable state.
//! Implementations live in rowhook-infra.

use rowhook_types::error::RepositoryError;

/// Trait for trigger-scoped key-value persistent storage.
///
/// Stores arbitrary JSON values keyed by trigger name and string key.
/// Values must survive process restarts.
pub trait KvStore: Send + Sync {
    /// Get a value by key. Returns None if the key does not exist.
    fn get(
        &self,
        trigger: &str,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<serde_json::Value>, RepositoryError>> + Send;

    /// Set a value for a key (upsert).
    fn set(
        &self,
        trigger: &str,
        key: &str,
        value: &serde_json::Value,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete a key. No-op if key does not exist.
    fn delete(
        &self,
        trigger: &str,
        key: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
