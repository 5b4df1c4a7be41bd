//! Repository configuration
//!
//! Loaded from YAML. Every field is optional:
//!
//! ```yaml
//! database:
//!   path: /var/lib/annograph/annotations.db
//! collections:
//!   annotation: annotation
//!   term: cvterm
//! default_page_size: 10
//! log_level: info
//! ```

use crate::logging;
use crate::repository::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::storage::{Collections, SqliteStore, StorageError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading configuration or opening the configured store
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error("Failed to open store: {0}")]
    Store(#[from] StorageError),
}

/// Where the store lives
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database file. Defaults to `<data dir>/annograph/annograph.db`.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    pub database: DatabaseConfig,
    pub collections: Collections,
    /// Page size for listings requested with `limit == 0`
    pub default_page_size: usize,
    pub log_level: String,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            collections: Collections::default(),
            default_page_size: DEFAULT_PAGE_SIZE,
            log_level: "info".to_string(),
        }
    }
}

impl RepositoryConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_PAGE_SIZE).contains(&self.default_page_size) {
            return Err(ConfigError::Invalid(format!(
                "default_page_size must be between 1 and {MAX_PAGE_SIZE}, got {}",
                self.default_page_size
            )));
        }
        logging::parse_level(&self.log_level).map_err(ConfigError::Invalid)?;
        self.collections.validate()?;
        Ok(())
    }

    /// Install the process-wide log subscriber at `log_level`
    pub fn init_logging(&self) -> Result<(), ConfigError> {
        logging::init_logging(&self.log_level).map_err(ConfigError::Invalid)
    }

    /// Configured database path, or the platform default
    pub fn database_path(&self) -> PathBuf {
        self.database.path.clone().unwrap_or_else(default_db_path)
    }

    /// Open (creating if needed) the configured store
    pub fn open_store(&self) -> Result<SqliteStore, ConfigError> {
        self.validate()?;
        let path = self.database_path();
        tracing::info!(path = %path.display(), "opening annotation store");
        Ok(SqliteStore::open_with(path, self.collections.clone())?)
    }
}

/// Default database path (~/.local/share/annograph/annograph.db on Linux)
pub fn default_db_path() -> PathBuf {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".local/share"));
    data_dir.join("annograph").join("annograph.db")
}
