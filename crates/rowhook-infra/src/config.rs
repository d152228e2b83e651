//! Global configuration loader for rowhook.
//!
//! Reads `config.toml` from the data directory (`~/.rowhook/` in production)
//! and deserializes it into [`GlobalConfig`]. Falls back to defaults when the
//! file is missing or malformed.

use std::path::Path;

use rowhook_types::config::{BaserowConfig, GlobalConfig};
use secrecy::SecretString;

/// Environment variable carrying the Baserow account password.
pub const PASSWORD_ENV: &str = "ROWHOOK_BASEROW_PASSWORD";

/// Load global configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`GlobalConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
pub async fn load_global_config(data_dir: &Path) -> GlobalConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
    };

    match toml::from_str::<GlobalConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            GlobalConfig::default()
        }
    }
}

/// Resolve the Baserow password from the environment, then the config file.
pub fn baserow_password(config: &BaserowConfig) -> Option<SecretString> {
    resolve_password(std::env::var(PASSWORD_ENV).ok(), config)
}

fn resolve_password(env_value: Option<String>, config: &BaserowConfig) -> Option<SecretString> {
    env_value
        .filter(|v| !v.is_empty())
        .or_else(|| config.password.clone())
        .map(SecretString::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_global_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.triggers.is_empty());
    }

    #[tokio::test]
    async fn load_global_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
public_url = "https://hooks.example.com"
request_timeout_secs = 10

[baserow]
username = "ops@example.com"
password = "from-file"

[[triggers]]
name = "orders"
database_id = "12"
table_id = "345"
events = ["rows.deleted"]
"#,
        )
        .await
        .unwrap();

        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(config.baserow.username, "ops@example.com");
        assert_eq!(config.triggers.len(), 1);
        assert_eq!(config.triggers[0].name, "orders");
    }

    #[tokio::test]
    async fn load_global_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.triggers.is_empty());
    }

    #[test]
    fn resolve_password_prefers_environment() {
        let config = BaserowConfig {
            password: Some("from-file".to_string()),
            ..BaserowConfig::default()
        };
        let password = resolve_password(Some("from-env".to_string()), &config).unwrap();
        assert_eq!(password.expose_secret(), "from-env");
    }

    #[test]
    fn resolve_password_falls_back_to_config() {
        let config = BaserowConfig {
            password: Some("from-file".to_string()),
            ..BaserowConfig::default()
        };
        let password = resolve_password(Some(String::new()), &config).unwrap();
        assert_eq!(password.expose_secret(), "from-file");
        assert!(resolve_password(None, &BaserowConfig::default()).is_none());
    }
}
