//! Application state wiring the Baserow client, trigger state store and
//! per-trigger subscription managers together.
//!
//! `SubscriptionManager` is generic over the API and store traits; AppState
//! pins it to the concrete infra implementations.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use tokio::sync::mpsc;

use rowhook_core::lifecycle::{Activation, SubscriptionManager};
use rowhook_infra::baserow::BaserowClient;
use rowhook_infra::config::{PASSWORD_ENV, baserow_password, load_global_config};
use rowhook_infra::filesystem::resolve_data_dir;
use rowhook_infra::sqlite::kv::SqliteKvStore;
use rowhook_infra::sqlite::pool::{DatabasePool, database_url};
use rowhook_types::config::{GlobalConfig, TriggerConfig};

use crate::sink::EmittedBatch;

/// Subscription manager pinned to the Baserow client and SQLite state.
pub type ConcreteManager = SubscriptionManager<BaserowClient, SqliteKvStore>;

/// Shared state for CLI commands and the server.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GlobalConfig>,
    pub data_dir: PathBuf,
    pub client: Arc<BaserowClient>,
    managers: Arc<HashMap<String, Arc<ConcreteManager>>>,
}

impl AppState {
    /// Initialize the application state: load config, open the database,
    /// build the Baserow client and one manager per configured trigger.
    ///
    /// With `require_credentials` unset, missing Baserow credentials are
    /// tolerated; any call that reaches the service then fails as unauthorized.
    pub async fn init(require_credentials: bool) -> anyhow::Result<Self> {
        Self::init_in(resolve_data_dir(), require_credentials).await
    }

    async fn init_in(data_dir: PathBuf, require_credentials: bool) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(&data_dir)
            .await
            .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

        let config = load_global_config(&data_dir).await;

        let password = baserow_password(&config.baserow);
        if require_credentials {
            if password.is_none() {
                bail!(
                    "no Baserow password configured: set {PASSWORD_ENV} or `password` under [baserow] in {}",
                    data_dir.join("config.toml").display()
                );
            }
            if config.baserow.username.is_empty() {
                bail!(
                    "no Baserow username configured: set `username` under [baserow] in {}",
                    data_dir.join("config.toml").display()
                );
            }
        }

        let pool = DatabasePool::new(&database_url(&data_dir))
            .await
            .context("failed to open trigger state database")?;
        let kv_store = Arc::new(SqliteKvStore::new(pool));
        let client = Arc::new(BaserowClient::from_config(&config, password)?);

        let mut managers = HashMap::new();
        for trigger in &config.triggers {
            let manager = Arc::new(SubscriptionManager::new(
                &trigger.name,
                Arc::clone(&client),
                Arc::clone(&kv_store),
            ));
            if managers.insert(trigger.name.clone(), manager).is_some() {
                bail!("duplicate trigger name '{}' in config.toml", trigger.name);
            }
        }

        tracing::debug!(
            data_dir = %data_dir.display(),
            require_credentials,
            host = %config.baserow.host,
            triggers = managers.len(),
            "application state initialized"
        );

        Ok(Self {
            config: Arc::new(config),
            data_dir,
            client,
            managers: Arc::new(managers),
        })
    }

    /// Look up a configured trigger and its manager.
    pub fn trigger(&self, name: &str) -> anyhow::Result<(&TriggerConfig, Arc<ConcreteManager>)> {
        let config = self.config.trigger(name).with_context(|| {
            format!(
                "unknown trigger '{name}': add a [[triggers]] entry to {}",
                self.data_dir.join("config.toml").display()
            )
        })?;
        let manager = self
            .managers
            .get(name)
            .cloned()
            .with_context(|| format!("no manager for trigger '{name}'"))?;
        Ok((config, manager))
    }

    /// Callback URL the table service should deliver `trigger`'s events to.
    pub fn callback_url(&self, trigger: &str) -> anyhow::Result<String> {
        callback_url(self.config.public_url.as_deref(), trigger)
    }

    /// Ensure `trigger` has a live subscription, registering one if needed.
    pub async fn activate(&self, name: &str) -> anyhow::Result<Activation> {
        let (trigger, manager) = self.trigger(name)?;
        let callback_url = self.callback_url(name)?;
        let events: BTreeSet<_> = trigger.events.iter().copied().collect();

        let activation = manager
            .activate(
                &trigger.target(),
                &events,
                &callback_url,
                &format!("rowhook {name}"),
            )
            .await
            .with_context(|| format!("failed to activate trigger '{name}'"))?;
        Ok(activation)
    }

    /// State shared with the webhook handlers.
    pub fn webhook_state(&self, events: mpsc::UnboundedSender<EmittedBatch>) -> WebhookState {
        WebhookState::new(self.config.triggers.iter().map(|t| t.name.clone()), events)
    }
}

/// Router state for the webhook receiver.
#[derive(Clone)]
pub struct WebhookState {
    pub triggers: Arc<HashSet<String>>,
    pub events: mpsc::UnboundedSender<EmittedBatch>,
}

impl WebhookState {
    pub fn new(
        triggers: impl IntoIterator<Item = String>,
        events: mpsc::UnboundedSender<EmittedBatch>,
    ) -> Self {
        Self {
            triggers: Arc::new(triggers.into_iter().collect()),
            events,
        }
    }
}

fn callback_url(public_url: Option<&str>, trigger: &str) -> anyhow::Result<String> {
    let base = public_url
        .map(|url| url.trim_end_matches('/'))
        .filter(|url| !url.is_empty())
        .context(
            "no public_url configured: set `public_url` in config.toml to the address the table service can reach",
        )?;
    Ok(format!("{base}/webhooks/{trigger}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callback_url_appends_trigger_path() {
        assert_eq!(
            callback_url(Some("https://hooks.example.com/"), "orders").unwrap(),
            "https://hooks.example.com/webhooks/orders"
        );
        assert_eq!(
            callback_url(Some("https://example.com/rowhook"), "orders").unwrap(),
            "https://example.com/rowhook/webhooks/orders"
        );
    }

    #[test]
    fn callback_url_requires_public_url() {
        let err = callback_url(None, "orders").unwrap_err();
        assert!(err.to_string().contains("public_url"));
        assert!(callback_url(Some(""), "orders").is_err());
    }

    const OFFLINE_CONFIG: &str = r#"
public_url = "https://hooks.example.com"

[baserow]
host = "http://127.0.0.1:1"

[[triggers]]
name = "orders"
database_id = "12"
table_id = "345"
events = ["rows.created"]
"#;

    #[tokio::test]
    async fn status_does_not_need_credentials() {
        let tmp = tempfile::tempdir().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), OFFLINE_CONFIG)
            .await
            .unwrap();

        let state = AppState::init_in(tmp.path().to_path_buf(), false)
            .await
            .unwrap();
        let (_, manager) = state.trigger("orders").unwrap();
        assert!(!manager.state().await.unwrap().is_registered());
    }

    #[tokio::test]
    async fn network_commands_need_credentials() {
        let tmp = tempfile::tempdir().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), OFFLINE_CONFIG)
            .await
            .unwrap();

        let err = AppState::init_in(tmp.path().to_path_buf(), true)
            .await
            .err()
            .unwrap();
        assert!(err.to_string().starts_with("no Baserow"));
    }

    #[test]
    fn webhook_state_collects_trigger_names() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let state = WebhookState::new(["orders".to_string(), "invoices".to_string()], tx);
        assert!(state.triggers.contains("orders"));
        assert!(!state.triggers.contains("customers"));
    }
}
