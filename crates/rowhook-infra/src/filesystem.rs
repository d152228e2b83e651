//! Data directory resolution.

use std::path::PathBuf;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "ROWHOOK_DATA_DIR";

/// Resolve the data directory holding `config.toml` and `rowhook.db`.
///
/// Uses `ROWHOOK_DATA_DIR` when set, otherwise `~/.rowhook`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".rowhook");
    }

    // Last resort: current directory
    PathBuf::from(".rowhook")
}
