use std::path::PathBuf;

use crate::storage::JsonStore;

/// Overrides the data directory.
pub const DATA_DIR_ENV: &str = "CHOREUST_DATA_DIR";
/// Log filter directives, e.g. `choreust=debug`.
pub const LOG_ENV: &str = "CHOREUST_LOG";

const DEFAULT_LOG_FILTER: &str = "warn";

/// Runtime settings, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding `chores.json` and `team.json`.
    pub data_dir: PathBuf,
    /// `tracing` filter directives for the stderr logger.
    pub log_filter: String,
}

impl Config {
    /// The data directory is chosen in the following order:
    /// 1. `CHOREUST_DATA_DIR` environment variable.
    /// 2. `~/.local/share/choreust` (on Linux).
    /// 3. `./` (fallback).
    pub fn from_env() -> Self {
        Config::from_vars(
            std::env::var(DATA_DIR_ENV).ok(),
            std::env::var(LOG_ENV).ok(),
        )
    }

    fn from_vars(data_dir: Option<String>, log_filter: Option<String>) -> Self {
        let data_dir = data_dir
            .filter(|d| !d.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                dirs::data_local_dir()
                    .map(|p| p.join("choreust"))
                    .unwrap_or_else(|| PathBuf::from("."))
            });
        let log_filter = log_filter
            .filter(|f| !f.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
        Config { data_dir, log_filter }
    }

    pub fn store(&self) -> JsonStore {
        JsonStore::new(&self.data_dir)
    }
}
