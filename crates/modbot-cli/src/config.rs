//! Configuration loading.
//!
//! Reads `config/default.toml` (or the file given with `--config`) and
//! applies environment overrides. Missing files, tables or keys fall back
//! to defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use modbot_store::DatabaseOptions;
use serde::Deserialize;

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Environment variable overriding `store.path`.
pub const DATABASE_ENV: &str = "MODBOT_DATABASE";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreSection,
    pub log: LogSection,
}

/// The `[store]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    /// Path of the SQLite file.
    pub path: PathBuf,
    /// SQLite busy timeout in milliseconds.
    pub busy_timeout_ms: u32,
    /// Whether to use write-ahead logging.
    pub wal: bool,
}

impl Default for StoreSection {
    fn default() -> Self {
        let options = DatabaseOptions::default();
        Self {
            path: PathBuf::from("data/modbot.db"),
            busy_timeout_ms: options.busy_timeout_ms,
            wal: options.wal,
        }
    }
}

/// The `[log]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("invalid configuration file")
    }

    /// Load configuration from `path`.
    ///
    /// A missing file yields the defaults; a malformed file is an error.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content)
                .with_context(|| format!("failed to load {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
        }
    }

    /// Apply the database path override, if any.
    pub fn with_database_override(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.store.path = path;
        }
        self
    }

    /// Connection options for the record store.
    pub fn database_options(&self) -> DatabaseOptions {
        DatabaseOptions::default()
            .with_busy_timeout_ms(self.store.busy_timeout_ms)
            .with_wal(self.store.wal)
    }
}

/// Resolve the effective configuration.
///
/// Precedence for the database path: `--database` flag, then
/// `MODBOT_DATABASE`, then the config file, then the default.
pub fn resolve(config_path: Option<&Path>, database: Option<PathBuf>) -> Result<AppConfig> {
    let path = config_path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));
    let env_database = std::env::var_os(DATABASE_ENV).map(PathBuf::from);

    Ok(AppConfig::load(path)?
        .with_database_override(env_database)
        .with_database_override(database))
}
