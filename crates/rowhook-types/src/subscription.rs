//! Subscription domain types.
//!
//! `SubscriptionState` is the lifecycle state of one trigger instance's remote
//! webhook. `SubscriptionRecord` is the shape it takes in durable storage.
//! `NewSubscription` / `RemoteSubscription` describe the create call and the
//! service's view of a webhook.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::event::EventKind;

/// Identifies the remote table a subscription monitors.
///
/// `table_id` is only meaningful within `database_id`; the set of valid
/// tables is looked up per database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSelector {
    pub database_id: String,
    pub table_id: String,
}

impl TargetSelector {
    pub fn new(database_id: impl Into<String>, table_id: impl Into<String>) -> Self {
        Self {
            database_id: database_id.into(),
            table_id: table_id.into(),
        }
    }
}

/// Lifecycle state of a trigger instance's remote subscription.
///
/// `Registered` carries the service's identifier and the event kinds the
/// service confirmed it will deliver, which may differ from what was asked for.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubscriptionState {
    #[default]
    Unregistered,
    Registered {
        subscription_id: String,
        granted_events: BTreeSet<EventKind>,
    },
}

impl SubscriptionState {
    pub fn is_registered(&self) -> bool {
        matches!(self, SubscriptionState::Registered { .. })
    }

    pub fn subscription_id(&self) -> Option<&str> {
        match self {
            SubscriptionState::Registered {
                subscription_id, ..
            } => Some(subscription_id),
            SubscriptionState::Unregistered => None,
        }
    }

    /// Granted events; empty when unregistered.
    pub fn granted_events(&self) -> BTreeSet<EventKind> {
        match self {
            SubscriptionState::Registered { granted_events, .. } => granted_events.clone(),
            SubscriptionState::Unregistered => BTreeSet::new(),
        }
    }
}

/// Persisted form of [`SubscriptionState`].
///
/// Both fields default when absent so records written by older versions
/// (or hand-edited ones) keep loading.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
    #[serde(default)]
    pub granted_events: Vec<String>,
}

impl From<&SubscriptionState> for SubscriptionRecord {
    fn from(state: &SubscriptionState) -> Self {
        match state {
            SubscriptionState::Unregistered => SubscriptionRecord::default(),
            SubscriptionState::Registered {
                subscription_id,
                granted_events,
            } => SubscriptionRecord {
                subscription_id: Some(subscription_id.clone()),
                granted_events: granted_events.iter().map(|e| e.as_str().to_string()).collect(),
            },
        }
    }
}

impl From<SubscriptionRecord> for SubscriptionState {
    /// A record without an id is `Unregistered` regardless of its event list.
    /// Event names this build does not know are skipped.
    fn from(record: SubscriptionRecord) -> Self {
        match record.subscription_id {
            None => SubscriptionState::Unregistered,
            Some(subscription_id) => SubscriptionState::Registered {
                subscription_id,
                granted_events: record
                    .granted_events
                    .iter()
                    .filter_map(|e| e.parse().ok())
                    .collect(),
            },
        }
    }
}

/// How the service should deliver callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeliveryMethod {
    Post,
}

/// Parameters for creating a remote subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubscription {
    pub table_id: String,
    pub callback_url: String,
    pub events: BTreeSet<EventKind>,
    pub method: DeliveryMethod,
    /// Shown to operators in the service's webhook list.
    pub name: String,
    /// Ask for field names rather than `field_<id>` keys in payloads.
    pub use_field_names: bool,
}

/// A webhook as reported by the service.
///
/// Fields are optional because a create response is validated by the caller,
/// not at decode time: a reply without `id` or with `active: false` is a
/// distinct failure from a transport error.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteSubscription {
    pub id: Option<String>,
    pub active: Option<bool>,
    pub events: Vec<String>,
    /// The undecoded response body, kept for error reporting.
    pub raw: Value,
}

impl RemoteSubscription {
    /// Read a webhook out of an arbitrary JSON body.
    ///
    /// Numeric ids are accepted and rendered as strings.
    pub fn from_json(raw: Value) -> Self {
        let id = match raw.get("id") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        let active = raw.get("active").and_then(Value::as_bool);
        let events = raw
            .get("events")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            id,
            active,
            events,
            raw,
        }
    }
}

/// A selectable database or table, as offered to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceOption {
    pub name: String,
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_roundtrip_through_state() {
        let state = SubscriptionState::Registered {
            subscription_id: "17".to_string(),
            granted_events: [EventKind::RowsCreated, EventKind::RowsDeleted].into(),
        };
        let record = SubscriptionRecord::from(&state);
        assert_eq!(record.subscription_id.as_deref(), Some("17"));
        assert_eq!(record.granted_events, vec!["rows.created", "rows.deleted"]);
        assert_eq!(SubscriptionState::from(record), state);
    }

    #[test]
    fn test_record_json_uses_camel_case() {
        let record = SubscriptionRecord {
            subscription_id: Some("9".to_string()),
            granted_events: vec!["rows.updated".to_string()],
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"subscriptionId": "9", "grantedEvents": ["rows.updated"]})
        );
    }

    #[test]
    fn test_record_missing_fields_default() {
        let record: SubscriptionRecord = serde_json::from_str("{}").unwrap();
        assert_eq!(record, SubscriptionRecord::default());
        assert_eq!(SubscriptionState::from(record), SubscriptionState::Unregistered);
    }

    #[test]
    fn test_record_without_id_is_unregistered() {
        let record = SubscriptionRecord {
            subscription_id: None,
            granted_events: vec!["rows.created".to_string()],
        };
        assert_eq!(SubscriptionState::from(record), SubscriptionState::Unregistered);
    }

    #[test]
    fn test_record_skips_unknown_events() {
        let record = SubscriptionRecord {
            subscription_id: Some("1".to_string()),
            granted_events: vec!["rows.created".to_string(), "view.created".to_string()],
        };
        let state = SubscriptionState::from(record);
        assert_eq!(state.granted_events(), [EventKind::RowsCreated].into());
    }

    #[test]
    fn test_remote_subscription_numeric_id() {
        let remote = RemoteSubscription::from_json(serde_json::json!({
            "id": 42,
            "active": true,
            "events": ["rows.created", "rows.updated"],
        }));
        assert_eq!(remote.id.as_deref(), Some("42"));
        assert_eq!(remote.active, Some(true));
        assert_eq!(remote.events.len(), 2);
    }

    #[test]
    fn test_remote_subscription_missing_fields() {
        let remote = RemoteSubscription::from_json(serde_json::json!({"detail": "queued"}));
        assert!(remote.id.is_none());
        assert!(remote.active.is_none());
        assert!(remote.events.is_empty());
    }
}
