//! Shared helper functions for CLI commands

use miette::Result;
use tracing::debug;

use crate::cli::args::PageArgs;
use crate::cli::GlobalOpts;
use crate::core::config::Config;
use crate::core::page::Page;
use crate::core::store::Store;

/// Global flags plus the configuration they resolve to
pub struct Context {
    pub global: GlobalOpts,
    pub config: Config,
}

impl Context {
    /// Load the layered configuration and apply the `--db` flag on top
    pub fn new(global: GlobalOpts) -> Result<Self> {
        let mut config = Config::load(global.config.as_deref())?;
        if let Some(db) = &global.db {
            config.database = db.clone();
        }
        Ok(Self { global, config })
    }

    /// `-v` wins over `log_level` from config or `TENDER_LOG`
    pub fn log_level(&self) -> &str {
        self.global
            .verbosity_level()
            .unwrap_or(self.config.log_level.as_str())
    }

    pub fn open_store(&self) -> Result<Store> {
        debug!(database = %self.config.database.display(), "opening store");
        Ok(Store::from_config(&self.config)?)
    }

    /// Validate `--limit` / `--offset` against the configured bounds
    pub fn page(&self, args: &PageArgs) -> Result<Page> {
        let limit = args
            .limit
            .unwrap_or_else(|| i64::from(self.config.default_limit));
        Ok(Page::checked(limit, args.offset, self.config.max_limit)?)
    }
}

/// Treat `""` the same as an omitted flag
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
