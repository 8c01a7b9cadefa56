//! # Application Configuration
//!
//! Settings loaded once at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`CROWDSHIP_*`)
//! 2. Config file (`crowdship.toml`)
//! 3. Defaults (this file)
//!
//! ## Config File Location
//! ```text
//! ~/.config/crowdship/crowdship.toml                               (Linux)
//! ~/Library/Application Support/com.crowdship.app/crowdship.toml   (macOS)
//! ```
//!
//! ## Example Config File
//! ```toml
//! database_path = "/var/lib/crowdship/crowdship.db"
//! max_connections = 4
//! log_filter = "info,crowdship=debug,sqlx=warn"
//!
//! [default_location]
//! latitude = 37.7749
//! longitude = -122.4194
//! ```
//!
//! Configuration is read-only after startup.

use std::path::{Path, PathBuf};

use crowdship_core::geo::Coordinates;
use crowdship_db::DbConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Default tracing filter when neither `RUST_LOG` nor config sets one.
pub const DEFAULT_LOG_FILTER: &str = "info,crowdship=debug,sqlx=warn";

const DB_FILE_NAME: &str = "crowdship.db";
const CONFIG_FILE_NAME: &str = "crowdship.toml";
const IN_MEMORY_PATH: &str = ":memory:";

pub const ENV_DB_PATH: &str = "CROWDSHIP_DB_PATH";
pub const ENV_LOG: &str = "CROWDSHIP_LOG";
pub const ENV_MAX_CONNECTIONS: &str = "CROWDSHIP_MAX_CONNECTIONS";

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite file holding the key-value store, or `:memory:`.
    pub database_path: PathBuf,

    /// Pool size for file-backed databases.
    pub max_connections: u32,

    /// `tracing_subscriber::EnvFilter` directive. `RUST_LOG` wins over it.
    pub log_filter: String,

    /// Used as the route origin until the device reports a position.
    pub default_location: Option<Coordinates>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_path: default_database_path(),
            max_connections: 5,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            default_location: None,
        }
    }
}

impl AppConfig {
    /// Configuration backed by an in-memory database (for tests and demos).
    pub fn in_memory() -> Self {
        AppConfig {
            database_path: PathBuf::from(IN_MEMORY_PATH),
            max_connections: 1,
            ..AppConfig::default()
        }
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`path`, or the platform config dir)
    /// 3. Environment variables
    pub fn load(path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = AppConfig::default();

        if let Some(path) = path.or_else(default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = AppConfig::from_toml_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Parses a TOML document. Missing fields take their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Rejects settings the app cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "max_connections must be greater than 0".into(),
            ));
        }

        if self.log_filter.trim().is_empty() {
            return Err(ConfigError::Invalid("log_filter must not be empty".into()));
        }

        if self.database_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("database_path must not be empty".into()));
        }

        if let Some(location) = self.default_location {
            if !location.is_valid() {
                return Err(ConfigError::Invalid(format!(
                    "default_location out of range: {}, {}",
                    location.latitude, location.longitude
                )));
            }
        }

        Ok(())
    }

    /// True when the database lives in memory.
    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == IN_MEMORY_PATH
    }

    /// Database settings derived from this config.
    pub fn db_config(&self) -> DbConfig {
        if self.is_in_memory() {
            DbConfig::in_memory()
        } else {
            DbConfig::new(&self.database_path).max_connections(self.max_connections)
        }
    }

    /// Creates the directory that will hold the database file.
    pub fn ensure_data_dir(&self) -> Result<(), ConfigError> {
        if self.is_in_memory() {
            return Ok(());
        }

        if let Some(parent) = self.database_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Applies `CROWDSHIP_*` environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup(ENV_DB_PATH) {
            debug!(path = %path, "Overriding database path from environment");
            self.database_path = PathBuf::from(path);
        }

        if let Some(filter) = lookup(ENV_LOG) {
            self.log_filter = filter;
        }

        if let Some(max) = lookup(ENV_MAX_CONNECTIONS) {
            match max.parse::<u32>() {
                Ok(n) => self.max_connections = n,
                Err(_) => warn!(value = %max, "Ignoring non-numeric {}", ENV_MAX_CONNECTIONS),
            }
        }
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "crowdship", "app")
}

/// Platform data dir + `crowdship.db`, or the working directory when the
/// platform has no home directory.
fn default_database_path() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().join(DB_FILE_NAME))
        .unwrap_or_else(|| Path::new(".").join(DB_FILE_NAME))
}

fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}
