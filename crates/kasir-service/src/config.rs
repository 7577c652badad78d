//! Service configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults. A `.env` file in the working directory is read first, if present.
//!
//! | Variable                   | Default      | Meaning                                  |
//! |----------------------------|--------------|------------------------------------------|
//! | `KASIR_DB_PATH`            | `./kasir.db` | SQLite database file                     |
//! | `KASIR_MAX_CONNECTIONS`    | `5`          | Pool size                                |
//! | `KASIR_BUSY_TIMEOUT_MS`    | `5000`       | How long a checkout waits for the writer |
//! | `KASIR_TRACK_STOCK`        | `true`       | Decrement stock during checkout          |
//! | `KASIR_UTC_OFFSET_MINUTES` | `0`          | Store time zone for calendar dates       |

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{FixedOffset, Offset, Utc};
use kasir_db::DbConfig;

/// Largest accepted `|KASIR_UTC_OFFSET_MINUTES|` (just under a day).
pub const MAX_UTC_OFFSET_MINUTES: i32 = 23 * 60 + 59;

/// Service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// SQLite database file.
    pub database_path: PathBuf,

    /// Maximum pooled connections.
    pub max_connections: u32,

    /// SQLite busy timeout for competing writers.
    pub busy_timeout: Duration,

    /// Whether checkout decrements stock for products that track it.
    pub track_stock: bool,

    /// Offset used to turn timestamps into calendar dates.
    pub utc_offset: FixedOffset,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            database_path: PathBuf::from("./kasir.db"),
            max_connections: 5,
            busy_timeout: Duration::from_millis(5000),
            track_stock: true,
            utc_offset: Utc.fix(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from `.env` (optional) and environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ServiceConfig::default();

        let database_path = lookup("KASIR_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.database_path);

        let max_connections: u32 = parse_or(&lookup, "KASIR_MAX_CONNECTIONS", 5)?;
        if max_connections == 0 {
            return Err(ConfigError::InvalidValue("KASIR_MAX_CONNECTIONS".to_string()));
        }

        let busy_timeout_ms: u64 = parse_or(&lookup, "KASIR_BUSY_TIMEOUT_MS", 5000)?;

        let track_stock = match lookup("KASIR_TRACK_STOCK") {
            None => defaults.track_stock,
            Some(raw) => parse_flag(&raw)
                .ok_or_else(|| ConfigError::InvalidValue("KASIR_TRACK_STOCK".to_string()))?,
        };

        let offset_minutes: i32 = parse_or(&lookup, "KASIR_UTC_OFFSET_MINUTES", 0)?;
        if offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
            return Err(ConfigError::InvalidValue("KASIR_UTC_OFFSET_MINUTES".to_string()));
        }
        let utc_offset = FixedOffset::east_opt(offset_minutes * 60)
            .ok_or_else(|| ConfigError::InvalidValue("KASIR_UTC_OFFSET_MINUTES".to_string()))?;

        Ok(ServiceConfig {
            database_path,
            max_connections,
            busy_timeout: Duration::from_millis(busy_timeout_ms),
            track_stock,
            utc_offset,
        })
    }

    /// The database configuration derived from this service configuration.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path)
            .max_connections(self.max_connections)
            .busy_timeout(self.busy_timeout)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

// =============================================================================
// Unit Tests
// =============================================================================
