//! Ports to the remote table service.
//!
//! `SubscriptionApi` is what the lifecycle manager talks to; `ResourceLoader`
//! backs the database/table pickers. Both report failures as [`ApiError`],
//! with "not found" as its own variant so callers never look at status codes.

use rowhook_types::error::ApiError;
use rowhook_types::subscription::{NewSubscription, RemoteSubscription, ResourceOption};

/// Webhook management endpoints of the table service.
///
/// Timeouts and cancellation are the implementation's concern; a timeout is
/// reported as [`ApiError::Transport`].
pub trait SubscriptionApi: Send + Sync {
    /// Fetch a webhook by id. [`ApiError::NotFound`] if the service has no such webhook.
    fn get_subscription(
        &self,
        id: &str,
    ) -> impl std::future::Future<Output = Result<RemoteSubscription, ApiError>> + Send;

    /// Create a webhook. The returned record is not validated.
    fn create_subscription(
        &self,
        request: &NewSubscription,
    ) -> impl std::future::Future<Output = Result<RemoteSubscription, ApiError>> + Send;

    /// Delete a webhook by id. [`ApiError::NotFound`] if it is already gone.
    fn delete_subscription(
        &self,
        id: &str,
    ) -> impl std::future::Future<Output = Result<(), ApiError>> + Send;
}

/// Lookups for the dependent database -> table selection.
pub trait ResourceLoader: Send + Sync {
    /// Databases visible to the configured account.
    fn list_databases(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<ResourceOption>, ApiError>> + Send;

    /// Tables inside `database_id`.
    fn list_tables(
        &self,
        database_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<ResourceOption>, ApiError>> + Send;
}
