//! Subscription lifecycle manager for a single trigger instance.
//!
//! The persisted record is trusted only for the absence fast path: with no
//! stored id, `exists` answers without a network call. A stored id is always
//! confirmed against the service, and a "not found" answer clears the record.
//!
//! Lifecycle calls on one manager are serialized by an internal lock, so the
//! host does not have to order activation and deactivation itself.

use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::Mutex;

use rowhook_types::error::{ApiError, LifecycleError, RepositoryError};
use rowhook_types::event::EventKind;
use rowhook_types::subscription::{
    DeliveryMethod, NewSubscription, SubscriptionRecord, SubscriptionState, TargetSelector,
};

use super::callback::ensure_publicly_reachable;
use crate::remote::SubscriptionApi;
use crate::repository::kv_store::KvStore;

/// KV key holding the trigger's [`SubscriptionRecord`].
pub const SUBSCRIPTION_KEY: &str = "subscription";

/// A subscription the service confirmed as active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub subscription_id: String,
    /// What the service will actually deliver; may differ from the request.
    pub granted_events: BTreeSet<EventKind>,
}

/// How an `unregister` call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnregisterOutcome {
    /// Nothing was registered; no request was sent.
    NotRegistered,
    /// The service deleted the webhook.
    Removed,
    /// The service had no such webhook. Local state was cleared anyway.
    AlreadyGone,
}

impl UnregisterOutcome {
    /// True when the remote record was missing although we expected it.
    pub fn is_partial_failure(&self) -> bool {
        matches!(self, UnregisterOutcome::AlreadyGone)
    }
}

/// Result of [`SubscriptionManager::activate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// The stored subscription was confirmed by the service.
    AlreadyActive { subscription_id: String },
    /// A new subscription was created.
    Registered(Registration),
}

/// Owns the durable subscription state of one trigger instance.
pub struct SubscriptionManager<A, S> {
    trigger: String,
    api: Arc<A>,
    store: Arc<S>,
    lifecycle: Mutex<()>,
}

impl<A: SubscriptionApi, S: KvStore> SubscriptionManager<A, S> {
    pub fn new(trigger: impl Into<String>, api: Arc<A>, store: Arc<S>) -> Self {
        Self {
            trigger: trigger.into(),
            api,
            store,
            lifecycle: Mutex::new(()),
        }
    }

    /// Name of the trigger instance this manager is bound to.
    pub fn trigger(&self) -> &str {
        &self.trigger
    }

    /// The persisted state, without consulting the service.
    pub async fn state(&self) -> Result<SubscriptionState, LifecycleError> {
        let _guard = self.lifecycle.lock().await;
        Ok(self.load().await?)
    }

    /// Whether the stored subscription still exists remotely.
    ///
    /// Returns false without a network call when nothing is stored. A "not
    /// found" answer clears the stored state; any other failure propagates
    /// and leaves it untouched.
    pub async fn exists(&self) -> Result<bool, LifecycleError> {
        let _guard = self.lifecycle.lock().await;
        self.exists_locked().await
    }

    /// Create a webhook on `target` for `events`, delivering to `callback_url`.
    ///
    /// Fails before any network call if `events` is empty or the callback URL
    /// points at a local address. Callers are expected to check [`exists`]
    /// first; this does not guard against double registration.
    ///
    /// [`exists`]: SubscriptionManager::exists
    pub async fn register(
        &self,
        target: &TargetSelector,
        events: &BTreeSet<EventKind>,
        callback_url: &str,
        display_name: &str,
    ) -> Result<Registration, LifecycleError> {
        let _guard = self.lifecycle.lock().await;
        self.register_locked(target, events, callback_url, display_name)
            .await
    }

    /// Delete the stored subscription remotely and clear local state.
    ///
    /// On a failure other than "not found" the local state is kept so a
    /// later call can retry against the same id.
    pub async fn unregister(&self) -> Result<UnregisterOutcome, LifecycleError> {
        let _guard = self.lifecycle.lock().await;

        let state = self.load().await?;
        let Some(subscription_id) = state.subscription_id() else {
            tracing::debug!(trigger = %self.trigger, "no subscription to remove");
            return Ok(UnregisterOutcome::NotRegistered);
        };

        let outcome = match self.api.delete_subscription(subscription_id).await {
            Ok(()) => UnregisterOutcome::Removed,
            Err(ApiError::NotFound) => {
                tracing::warn!(
                    trigger = %self.trigger,
                    subscription_id,
                    "webhook was already gone on the table service"
                );
                UnregisterOutcome::AlreadyGone
            }
            Err(e) => {
                tracing::error!(
                    trigger = %self.trigger,
                    subscription_id,
                    error = %e,
                    "failed to delete webhook, keeping local state"
                );
                return Err(e.into());
            }
        };

        self.save(&SubscriptionState::Unregistered).await?;
        tracing::info!(trigger = %self.trigger, subscription_id, ?outcome, "webhook unregistered");

        Ok(outcome)
    }

    /// Check for an existing subscription and register one if there is none.
    pub async fn activate(
        &self,
        target: &TargetSelector,
        events: &BTreeSet<EventKind>,
        callback_url: &str,
        display_name: &str,
    ) -> Result<Activation, LifecycleError> {
        let _guard = self.lifecycle.lock().await;

        if self.exists_locked().await? {
            let subscription_id = self
                .load()
                .await?
                .subscription_id()
                .map(str::to_string)
                .unwrap_or_default();
            return Ok(Activation::AlreadyActive { subscription_id });
        }

        let registration = self
            .register_locked(target, events, callback_url, display_name)
            .await?;
        Ok(Activation::Registered(registration))
    }

    async fn exists_locked(&self) -> Result<bool, LifecycleError> {
        let state = self.load().await?;
        let Some(subscription_id) = state.subscription_id() else {
            return Ok(false);
        };

        match self.api.get_subscription(subscription_id).await {
            Ok(_) => Ok(true),
            Err(ApiError::NotFound) => {
                tracing::warn!(
                    trigger = %self.trigger,
                    subscription_id,
                    "webhook no longer exists on the table service, clearing local state"
                );
                self.save(&SubscriptionState::Unregistered).await?;
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn register_locked(
        &self,
        target: &TargetSelector,
        events: &BTreeSet<EventKind>,
        callback_url: &str,
        display_name: &str,
    ) -> Result<Registration, LifecycleError> {
        if events.is_empty() {
            return Err(LifecycleError::Configuration(format!(
                "trigger '{}' must listen to at least one event",
                self.trigger
            )));
        }
        ensure_publicly_reachable(callback_url)?;

        let request = NewSubscription {
            table_id: target.table_id.clone(),
            callback_url: callback_url.to_string(),
            events: events.clone(),
            method: DeliveryMethod::Post,
            name: display_name.to_string(),
            use_field_names: true,
        };

        let remote = self.api.create_subscription(&request).await?;

        let subscription_id = match (remote.id, remote.active) {
            (Some(id), Some(true)) => id,
            _ => {
                return Err(LifecycleError::UnexpectedResponse {
                    body: remote.raw.to_string(),
                });
            }
        };

        let granted_events: BTreeSet<EventKind> = remote
            .events
            .iter()
            .filter_map(|name| match name.parse::<EventKind>() {
                Ok(kind) => Some(kind),
                Err(_) => {
                    tracing::warn!(trigger = %self.trigger, event = %name, "ignoring unknown granted event");
                    None
                }
            })
            .collect();

        self.save(&SubscriptionState::Registered {
            subscription_id: subscription_id.clone(),
            granted_events: granted_events.clone(),
        })
        .await?;

        tracing::info!(
            trigger = %self.trigger,
            subscription_id = %subscription_id,
            table_id = %target.table_id,
            granted = ?granted_events,
            "webhook registered"
        );

        Ok(Registration {
            subscription_id,
            granted_events,
        })
    }

    async fn load(&self) -> Result<SubscriptionState, RepositoryError> {
        let Some(value) = self.store.get(&self.trigger, SUBSCRIPTION_KEY).await? else {
            return Ok(SubscriptionState::Unregistered);
        };
        let record: SubscriptionRecord = serde_json::from_value(value)
            .map_err(|e| RepositoryError::Query(format!("invalid subscription record: {e}")))?;
        Ok(record.into())
    }

    async fn save(&self, state: &SubscriptionState) -> Result<(), RepositoryError> {
        match state {
            SubscriptionState::Unregistered => {
                self.store.delete(&self.trigger, SUBSCRIPTION_KEY).await
            }
            SubscriptionState::Registered { .. } => {
                let value = serde_json::to_value(SubscriptionRecord::from(state))
                    .map_err(|e| RepositoryError::Query(format!("failed to serialize record: {e}")))?;
                self.store.set(&self.trigger, SUBSCRIPTION_KEY, &value).await
            }
        }
    }
}
