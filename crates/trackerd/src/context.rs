//! Runtime context for command execution.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Duration;
use tracing::info;

use tracker_config::{TrackerConfig, load_config};
use tracker_core::filter::PageLimits;
use tracker_storage::SqliteStore;

use crate::cli::GlobalArgs;

/// Everything a command handler needs: the loaded configuration with CLI
/// overrides applied, and the output flags.
#[derive(Debug)]
pub struct RuntimeContext {
    pub config: TrackerConfig,
    pub json: bool,
    pub verbose: bool,
    pub quiet: bool,
}

impl RuntimeContext {
    /// Loads the configuration and applies the global flags on top of it.
    pub fn from_global_args(global: &GlobalArgs) -> Result<Self> {
        let mut config = load_config(global.config.as_deref()).context("failed to load configuration")?;
        if let Some(ref db) = global.db {
            config.database.path = db.clone();
        }
        Ok(Self {
            config,
            json: global.json,
            verbose: global.verbose,
            quiet: global.quiet,
        })
    }

    pub fn db_path(&self) -> &PathBuf {
        &self.config.database.path
    }

    /// Opens the database, creating and migrating it as needed.
    pub fn open_store(&self) -> Result<SqliteStore> {
        let path = self.db_path();
        let store = SqliteStore::open(path)
            .with_context(|| format!("failed to open database: {}", path.display()))?;
        info!(path = %path.display(), "database opened");
        Ok(store)
    }

    pub fn page_limits(&self) -> PageLimits {
        PageLimits {
            default_page_size: self.config.pagination.default_page_size,
            max_page_size: self.config.pagination.max_page_size,
        }
    }

    /// Session lifetime, from the flag if given, else from the configuration.
    pub fn session_ttl(&self, hours: Option<u32>) -> Duration {
        Duration::hours(i64::from(hours.unwrap_or(self.config.session.ttl_hours)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> RuntimeContext {
        RuntimeContext {
            config: TrackerConfig::default(),
            json: false,
            verbose: false,
            quiet: false,
        }
    }

    #[test]
    fn session_ttl_prefers_flag() {
        let ctx = ctx();
        assert_eq!(ctx.session_ttl(Some(2)), Duration::hours(2));
        assert_eq!(ctx.session_ttl(None), Duration::hours(720));
    }

    #[test]
    fn page_limits_follow_config() {
        let limits = ctx().page_limits();
        assert_eq!(limits.default_page_size, 10);
        assert_eq!(limits.max_page_size, 100);
    }
}
