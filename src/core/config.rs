//! Configuration management
//!
//! Settings are layered, later layers winning:
//! built-in defaults, the user config file
//! (`<config dir>/tender/config.yaml`), an explicit `--config` file, then the
//! `TENDER_DB` and `TENDER_LOG` environment variables. Command line flags are
//! applied on top by the CLI.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::error::{Result, TenderError};
use crate::core::page::{DEFAULT_LIMIT, MAX_LIMIT};

pub const DB_ENV: &str = "TENDER_DB";
pub const LOG_ENV: &str = "TENDER_LOG";

const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;
const DEFAULT_LOG_LEVEL: &str = "info";

/// Effective settings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    /// SQLite database file
    pub database: PathBuf,

    /// How long a writer waits for a locked database
    pub busy_timeout_ms: u64,

    /// Log level or full filter directive for the `tender` target
    pub log_level: String,

    /// Page size when a listing is not given `--limit`
    pub default_limit: u32,

    /// Largest `--limit` accepted
    pub max_limit: u32,
}

/// One layer as read from a YAML file; every key is optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ConfigLayer {
    database: Option<PathBuf>,
    busy_timeout_ms: Option<u64>,
    log_level: Option<String>,
    default_limit: Option<u32>,
    max_limit: Option<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            default_limit: DEFAULT_LIMIT,
            max_limit: MAX_LIMIT,
        }
    }
}

impl Config {
    /// Load defaults, the user config file, `explicit` and the environment
    ///
    /// A missing user config file is fine; a missing explicit file is not.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = user_config_path() {
            if path.exists() {
                config.merge_file(&path)?;
            }
        }
        if let Some(path) = explicit {
            config.merge_file(path)?;
        }

        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Merge the keys present in a YAML file
    pub fn merge_file(&mut self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path).map_err(|e| TenderError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let layer: ConfigLayer = serde_yml::from_str(&content).map_err(|e| TenderError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        debug!(path = %path.display(), "merging config file");
        self.merge(layer);
        Ok(())
    }

    fn merge(&mut self, layer: ConfigLayer) {
        if let Some(database) = layer.database {
            self.database = database;
        }
        if let Some(ms) = layer.busy_timeout_ms {
            self.busy_timeout_ms = ms;
        }
        if let Some(level) = layer.log_level {
            self.log_level = level;
        }
        if let Some(limit) = layer.default_limit {
            self.default_limit = limit;
        }
        if let Some(limit) = layer.max_limit {
            self.max_limit = limit;
        }
    }

    /// Apply `TENDER_DB` / `TENDER_LOG` as returned by `lookup`
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(db) = lookup(DB_ENV).filter(|v| !v.is_empty()) {
            self.database = PathBuf::from(db);
        }
        if let Some(level) = lookup(LOG_ENV).filter(|v| !v.is_empty()) {
            self.log_level = level;
        }
    }

    fn validate(&self) -> Result<()> {
        if self.max_limit > MAX_LIMIT {
            return Err(TenderError::invalid(
                "max_limit",
                format!("must be at most {}", MAX_LIMIT),
            ));
        }
        if self.default_limit > self.max_limit {
            return Err(TenderError::invalid(
                "default_limit",
                format!("must not exceed max_limit ({})", self.max_limit),
            ));
        }
        Ok(())
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "tender")
}

/// `<config dir>/tender/config.yaml`, if the platform has a config dir
pub fn user_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("config.yaml"))
}

fn default_database() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().join("tender.db"))
        .unwrap_or_else(|| PathBuf::from("tender.db"))
}
