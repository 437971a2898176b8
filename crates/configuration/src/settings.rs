use crate::error::ConfigError;
use chrono::FixedOffset;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub server: ServerSettings,
    /// Upper bound for a single instrument or price fetch.
    pub fetch_timeout_secs: u64,
    /// The civil timezone price timestamps are converted into before their
    /// calendar date is taken, as an ISO offset (e.g. "+03:00").
    pub reference_utc_offset: String,
    /// How many rows the top/bottom rankings show.
    pub ranking_size: usize,
    /// Default export format when the CLI is given an output path.
    pub export_format: ExportFormat,
    /// Default `EnvFilter` directive when `RUST_LOG` is not set.
    pub log_level: String,
    /// When set, logs are also written to a daily-rolling file in this directory.
    pub log_dir: Option<PathBuf>,
}

/// Connection settings for the two relational stores.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// DSN of the instrument catalog (derivatives and brokerages).
    pub catalog_url: Option<String>,
    /// DSN of the tick store holding daily OHLCV bars.
    pub prices_url: Option<String>,
    pub connect_timeout_secs: u64,
}

/// Settings for the web front end.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub bind_addr: SocketAddr,
    pub max_upload_bytes: usize,
}

/// File format for exported results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
}

impl Settings {
    /// Parses `reference_utc_offset` into a `FixedOffset`.
    pub fn reference_zone(&self) -> Result<FixedOffset, ConfigError> {
        self.reference_utc_offset.parse::<FixedOffset>().map_err(|e| {
            ConfigError::ValidationError(format!(
                "reference_utc_offset '{}' is not a valid UTC offset: {}",
                self.reference_utc_offset, e
            ))
        })
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Checks invariants that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.reference_zone()?;
        if self.ranking_size == 0 {
            return Err(ConfigError::ValidationError(
                "ranking_size must be at least 1".to_string(),
            ));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "fetch_timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl DatabaseSettings {
    /// Returns `(catalog_url, prices_url)`, failing if either is not configured.
    pub fn urls(&self) -> Result<(&str, &str), ConfigError> {
        match (self.catalog_url.as_deref(), self.prices_url.as_deref()) {
            (Some(catalog), Some(prices)) => Ok((catalog, prices)),
            (catalog, prices) => {
                let mut missing = Vec::new();
                if catalog.is_none() {
                    missing.push("database.catalog_url");
                }
                if prices.is_none() {
                    missing.push("database.prices_url");
                }
                Err(ConfigError::ValidationError(format!(
                    "database mode requires {}",
                    missing.join(" and ")
                )))
            }
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}
