//! # Configuration
//!
//! Settings loaded once at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`TILL_*`)
//! 2. Defaults (this file)
//!
//! Read-only after load; commands receive it by reference.

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use serde::Serialize;

use till_core::{ReportingZone, StoreInfo, DEFAULT_LOW_STOCK_THRESHOLD};
use till_db::{CommitterConfig, DbConfig, DEFAULT_BUSY_TIMEOUT};

/// Application configuration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// SQLite database file.
    /// Default: platform data directory, `till.db`
    pub db_path: PathBuf,

    /// Store name printed on receipts.
    pub store_name: String,

    /// Store address lines printed on receipts.
    pub store_address: Vec<String>,

    /// Goods below this stock are reported as low.
    /// Default: 10
    pub low_stock_threshold: i64,

    /// Offset from UTC used to pick the calendar date of a sale.
    /// Default: 0
    pub utc_offset_minutes: i32,

    /// Accept payments below the sale total.
    /// Default: true
    pub allow_underpayment: bool,

    /// Upper bound on a single store call during a commit.
    /// Default: 5
    pub commit_timeout_secs: u64,

    /// Attempts made when stock changes under a commit.
    /// Default: 3
    pub conflict_retries: u32,

    /// Wait for another till's write lock, in milliseconds.
    /// Default: 2000
    pub busy_timeout_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            db_path: default_db_path(),
            store_name: "Till POS".to_string(),
            store_address: Vec::new(),
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            utc_offset_minutes: 0,
            allow_underpayment: true,
            commit_timeout_secs: 5,
            conflict_retries: 3,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT.as_millis() as u64,
        }
    }
}

impl AppConfig {
    /// Loads configuration from the process environment.
    ///
    /// ## Environment Variables
    /// - `TILL_DB_PATH`: database file
    /// - `TILL_STORE_NAME`: receipt header
    /// - `TILL_STORE_ADDRESS`: receipt address, lines separated by `|`
    /// - `TILL_LOW_STOCK_THRESHOLD`: positive integer
    /// - `TILL_UTC_OFFSET_MINUTES`: e.g. `300` for UTC+05:00
    /// - `TILL_ALLOW_UNDERPAYMENT`: `true` / `false`
    /// - `TILL_COMMIT_TIMEOUT_SECS`: positive integer
    /// - `TILL_CONFLICT_RETRIES`: positive integer
    /// - `TILL_BUSY_TIMEOUT_MS`: positive integer
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = AppConfig::default();

        if let Some(path) = lookup("TILL_DB_PATH") {
            config.db_path = PathBuf::from(path);
        }

        if let Some(name) = lookup("TILL_STORE_NAME") {
            config.store_name = name;
        }

        if let Some(address) = lookup("TILL_STORE_ADDRESS") {
            config.store_address = address
                .split('|')
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(String::from)
                .collect();
        }

        if let Some(raw) = lookup("TILL_LOW_STOCK_THRESHOLD") {
            config.low_stock_threshold = parse("TILL_LOW_STOCK_THRESHOLD", &raw)?;
            if config.low_stock_threshold <= 0 {
                return Err(ConfigError::InvalidValue("TILL_LOW_STOCK_THRESHOLD".to_string()));
            }
        }

        if let Some(raw) = lookup("TILL_UTC_OFFSET_MINUTES") {
            config.utc_offset_minutes = parse("TILL_UTC_OFFSET_MINUTES", &raw)?;
            if ReportingZone::from_offset_minutes(config.utc_offset_minutes).is_none() {
                return Err(ConfigError::InvalidValue("TILL_UTC_OFFSET_MINUTES".to_string()));
            }
        }

        if let Some(raw) = lookup("TILL_ALLOW_UNDERPAYMENT") {
            config.allow_underpayment = parse("TILL_ALLOW_UNDERPAYMENT", &raw)?;
        }

        if let Some(raw) = lookup("TILL_COMMIT_TIMEOUT_SECS") {
            config.commit_timeout_secs = parse("TILL_COMMIT_TIMEOUT_SECS", &raw)?;
            if config.commit_timeout_secs == 0 {
                return Err(ConfigError::InvalidValue("TILL_COMMIT_TIMEOUT_SECS".to_string()));
            }
        }

        if let Some(raw) = lookup("TILL_CONFLICT_RETRIES") {
            config.conflict_retries = parse("TILL_CONFLICT_RETRIES", &raw)?;
            if config.conflict_retries == 0 {
                return Err(ConfigError::InvalidValue("TILL_CONFLICT_RETRIES".to_string()));
            }
        }

        if let Some(raw) = lookup("TILL_BUSY_TIMEOUT_MS") {
            config.busy_timeout_ms = parse("TILL_BUSY_TIMEOUT_MS", &raw)?;
            if config.busy_timeout_ms == 0 {
                return Err(ConfigError::InvalidValue("TILL_BUSY_TIMEOUT_MS".to_string()));
            }
        }

        Ok(config)
    }

    pub fn store_info(&self) -> StoreInfo {
        StoreInfo {
            name: self.store_name.clone(),
            address_lines: self.store_address.clone(),
            ..StoreInfo::default()
        }
    }

    pub fn reporting_zone(&self) -> ReportingZone {
        ReportingZone::from_offset_minutes(self.utc_offset_minutes).unwrap_or_default()
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.db_path).busy_timeout(self.busy_timeout())
    }

    /// The commit timeout is raised if it would not outlast the busy wait.
    pub fn committer_config(&self) -> CommitterConfig {
        CommitterConfig::default()
            .max_conflict_retries(self.conflict_retries)
            .store_timeout(Duration::from_secs(self.commit_timeout_secs))
            .covering_busy_timeout(self.busy_timeout())
            .allow_underpayment(self.allow_underpayment)
    }

    fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

fn parse<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(key.to_string()))
}

/// Platform data directory, falling back to the working directory.
///
/// - **macOS**: `~/Library/Application Support/com.till.pos/till.db`
/// - **Windows**: `%APPDATA%\till\pos\data\till.db`
/// - **Linux**: `~/.local/share/pos/till.db`
fn default_db_path() -> PathBuf {
    ProjectDirs::from("com", "till", "pos")
        .map(|dirs| dirs.data_dir().join("till.db"))
        .unwrap_or_else(|| PathBuf::from("till.db"))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Could not create data directory {path}: {reason}")]
    DataDir { path: String, reason: String },
}
