//! Configuration loading and representation.
//!
//! Sources, later ones overriding earlier ones:
//! 1. built-in defaults
//! 2. optional `config/stockroom.toml`
//! 3. `STOCKROOM__<SECTION>__<KEY>` environment variables
//!    (e.g. `STOCKROOM__INVENTORY__DEFAULT_ACTOR=ops-bot`)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "config/stockroom.toml";
pub const ENV_PREFIX: &str = "STOCKROOM";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub inventory: InventoryConfig,
    #[serde(default)]
    pub import: ImportConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres URL. When absent the in-memory stores are used.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
        }
    }
}

/// When the stock change event is written relative to the item write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryOrdering {
    /// Persist the item first; record the event only if that write succeeded.
    #[default]
    PersistFirst,
    /// Record the event before attempting the item write. A failed write
    /// (e.g. duplicate name) still leaves the event behind.
    ///
    /// Legacy-parity mode: matches the event-before-write order of the
    /// earlier catalog service, for deployments that compare histories.
    RecordIntentFirst,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InventoryConfig {
    /// Actor recorded on stock changes when the request does not name one.
    #[serde(default = "default_actor")]
    pub default_actor: String,
    #[serde(default)]
    pub history_ordering: HistoryOrdering,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            default_actor: default_actor(),
            history_ordering: HistoryOrdering::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImportConfig {
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Directory for spooled uploads; the system temp dir when absent.
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: default_max_upload_bytes(),
            temp_dir: None,
        }
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_actor() -> String {
    "Admin".to_string()
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

impl AppConfig {
    /// Load from [`DEFAULT_CONFIG_FILE`] (optional) and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new(DEFAULT_CONFIG_FILE))
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_without_sources() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.server.bind_addr, "0.0.0.0:3000");
        assert_eq!(cfg.database.url, None);
        assert_eq!(cfg.inventory.default_actor, "Admin");
        assert_eq!(cfg.inventory.history_ordering, HistoryOrdering::PersistFirst);
        assert_eq!(cfg.import.max_upload_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = AppConfig::load_from(Path::new("does/not/exist.toml")).unwrap();
        assert_eq!(cfg.inventory.default_actor, AppConfig::default().inventory.default_actor);
    }

    #[test]
    fn reads_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[inventory]
default_actor = "warehouse-bot"
history_ordering = "record_intent_first"

[database]
url = "postgres://localhost/stockroom"
"#
        )
        .unwrap();

        let cfg = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(cfg.inventory.default_actor, "warehouse-bot");
        assert_eq!(cfg.inventory.history_ordering, HistoryOrdering::RecordIntentFirst);
        assert_eq!(cfg.database.url.as_deref(), Some("postgres://localhost/stockroom"));
        assert_eq!(cfg.database.max_connections, 10);
    }
}
