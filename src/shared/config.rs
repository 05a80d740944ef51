//! Application configuration. Storage backend, paths, analytics defaults.
//!
//! Values come from `PSYTRACK_*` environment variables (a `.env` file is honoured) and,
//! when `PSYTRACK_CONFIG` points at one, a config file (TOML/JSON/YAML by extension).

use crate::domain::DomainError;
use crate::domain::analytics::{DEFAULT_TIMESPAN_DAYS, MAX_TIMESPAN_DAYS};
use serde::Deserialize;
use std::num::NonZeroU32;
use std::path::PathBuf;

pub const DEFAULT_DATA_DIR: &str = "./data";

/// Which repository implementation backs the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// libsql database file under the data directory.
    Sqlite,
    /// Process-local maps; nothing is written to disk.
    Memory,
}

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Directory holding psytrack.db. Read from PSYTRACK_DATA_DIR.
    #[serde(default)]
    pub data_dir: Option<String>,

    /// "sqlite" (default) or "memory". Read from PSYTRACK_STORAGE.
    #[serde(default)]
    pub storage: Option<String>,

    /// Trend window used when the caller does not pass one. Read from PSYTRACK_DEFAULT_TIMESPAN_DAYS.
    #[serde(default)]
    pub default_timespan_days: Option<u32>,

    /// Where exported reports go. Defaults to `<data_dir>/reports`. Read from PSYTRACK_REPORTS_DIR.
    #[serde(default)]
    pub reports_dir: Option<String>,

    /// Insert the built-in disorder list into an empty store. Read from PSYTRACK_SEED_DISORDERS.
    #[serde(default)]
    pub seed_disorders: Option<bool>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        if let Ok(path) = std::env::var("PSYTRACK_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        // Environment wins over the file.
        c = c.add_source(config::Environment::with_prefix("PSYTRACK").try_parsing(true));
        c.build()?.try_deserialize()
    }

    pub fn data_dir_or_default(&self) -> PathBuf {
        PathBuf::from(self.data_dir.as_deref().unwrap_or(DEFAULT_DATA_DIR))
    }

    pub fn reports_dir_or_default(&self) -> PathBuf {
        self.reports_dir
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| self.data_dir_or_default().join("reports"))
    }

    /// Parses `storage`. Unknown values are an error rather than a silent fallback.
    pub fn storage_backend(&self) -> Result<StorageBackend, DomainError> {
        match self
            .storage
            .as_deref()
            .map(|s| s.trim().to_ascii_lowercase())
            .as_deref()
        {
            None | Some("") | Some("sqlite") => Ok(StorageBackend::Sqlite),
            Some("memory") => Ok(StorageBackend::Memory),
            Some(other) => Err(DomainError::Config(format!(
                "unknown storage backend '{}' (expected 'sqlite' or 'memory')",
                other
            ))),
        }
    }

    /// Returns the default trend window. 0 or unset falls back to 7 days.
    /// Zero or anything above [`MAX_TIMESPAN_DAYS`] falls back to the default.
    pub fn default_timespan_or_default(&self) -> NonZeroU32 {
        self.default_timespan_days
            .filter(|days| *days <= MAX_TIMESPAN_DAYS)
            .and_then(NonZeroU32::new)
            .or_else(|| NonZeroU32::new(DEFAULT_TIMESPAN_DAYS))
            .unwrap_or(NonZeroU32::MIN)
    }

    pub fn seed_disorders_or_default(&self) -> bool {
        self.seed_disorders.unwrap_or(true)
    }
}
