//! Global configuration types for rowhook.
//!
//! `GlobalConfig` represents the top-level `config.toml`: where the table
//! service lives, how to reach this host from the outside, and which
//! triggers to run.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::event::EventKind;
use crate::subscription::TargetSelector;

/// Top-level configuration.
///
/// Loaded from `~/.rowhook/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Externally reachable base URL of this host (e.g. a tunnel URL).
    /// Callback URLs are issued as `{public_url}/webhooks/{trigger}`.
    #[serde(default)]
    pub public_url: Option<String>,

    /// Timeout for each table service request, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub baserow: BaserowConfig,

    #[serde(default)]
    pub triggers: Vec<TriggerConfig>,
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            public_url: None,
            request_timeout_secs: default_request_timeout_secs(),
            baserow: BaserowConfig::default(),
            triggers: Vec::new(),
        }
    }
}

impl GlobalConfig {
    pub fn trigger(&self, name: &str) -> Option<&TriggerConfig> {
        self.triggers.iter().find(|t| t.name == name)
    }
}

/// Table service connection settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct BaserowConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default)]
    pub username: String,

    /// Usually supplied through the environment instead.
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
}

fn default_host() -> String {
    "https://api.baserow.io".to_string()
}

impl Default for BaserowConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            username: String::new(),
            password: None,
        }
    }
}

impl fmt::Debug for BaserowConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaserowConfig")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// One trigger instance: which table to watch and for which events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerConfig {
    /// Unique name; scopes durable state and the callback path.
    pub name: String,
    pub database_id: String,
    pub table_id: String,
    pub events: Vec<EventKind>,
}

impl TriggerConfig {
    pub fn target(&self) -> TargetSelector {
        TargetSelector::new(&self.database_id, &self.table_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_config_default_values() {
        let config = GlobalConfig::default();
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.baserow.host, "https://api.baserow.io");
        assert!(config.public_url.is_none());
        assert!(config.triggers.is_empty());
    }

    #[test]
    fn test_global_config_deserialize_with_defaults() {
        let config: GlobalConfig = toml::from_str("").unwrap();
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.triggers.is_empty());
    }

    #[test]
    fn test_global_config_deserialize_with_values() {
        let toml_str = r#"
public_url = "https://hooks.example.com"

[baserow]
host = "https://baserow.internal"
username = "ops@example.com"

[[triggers]]
name = "orders"
database_id = "12"
table_id = "345"
events = ["rows.created", "rows.updated"]
"#;
        let config: GlobalConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.public_url.as_deref(), Some("https://hooks.example.com"));
        assert_eq!(config.baserow.host, "https://baserow.internal");
        assert!(config.baserow.password.is_none());

        let trigger = config.trigger("orders").unwrap();
        assert_eq!(trigger.target(), TargetSelector::new("12", "345"));
        assert_eq!(
            trigger.events,
            vec![EventKind::RowsCreated, EventKind::RowsUpdated]
        );
        assert!(config.trigger("missing").is_none());
    }

    #[test]
    fn test_baserow_config_debug_redacts_password() {
        let config = BaserowConfig {
            host: "https://baserow.internal".to_string(),
            username: "ops".to_string(),
            password: Some("hunter2".to_string()),
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("[REDACTED]"));
    }
}
