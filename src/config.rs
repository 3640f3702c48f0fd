//! Process configuration, loaded once from the environment at startup

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::datastore::MySqlConfig;
use crate::monitor::Thresholds;
use crate::scheduler::DEFAULT_PROBE_INTERVAL;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database: MySqlConfig,
    /// Webhook endpoint for alerts; absent means alerts only log locally
    /// and every delivery attempt reports failure
    pub webhook_url: Option<String>,
    pub probe_interval: Duration,
    pub thresholds: Thresholds,
    pub report_dir: String,
}

impl Config {
    /// Read configuration from the environment.
    ///
    /// `DB_HOST`, `DB_USER`, `DB_PASSWORD` and `DB_NAME` are required;
    /// everything else falls back to a default. There is no hot reload:
    /// thresholds may be mutated later through the shared cell, but the
    /// environment is read exactly once.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Thresholds::default();

        Ok(Self {
            database: MySqlConfig {
                host: required("DB_HOST")?,
                port: parsed("DB_PORT", 3306)?,
                user: required("DB_USER")?,
                password: required("DB_PASSWORD")?,
                database: required("DB_NAME")?,
                charset: env::var("DB_CHARSET").unwrap_or_else(|_| "utf8mb4".to_string()),
            },
            webhook_url: env::var("ALERT_WEBHOOK_URL").ok(),
            probe_interval: Duration::from_secs(parsed(
                "PROBE_INTERVAL_SECS",
                DEFAULT_PROBE_INTERVAL.as_secs(),
            )?),
            thresholds: Thresholds {
                slow_query_cost: parsed("SLOW_QUERY_COST", defaults.slow_query_cost)?,
                lock_warning: parsed("LOCK_WARNING", defaults.lock_warning)?,
                rows_warning: parsed("ROWS_WARNING", defaults.rows_warning)?,
            },
            report_dir: env::var("REPORT_DIR").unwrap_or_else(|_| "reports".to_string()),
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing(name))
}

fn parsed<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ConfigError::Invalid(name, raw)),
        Err(_) => Ok(default),
    }
}
