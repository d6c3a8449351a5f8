//! Dashboard configuration, loaded from TOML.
//!
//! Every field has a default, so an absent file or a partial file is fine:
//!
//! ```toml
//! [backend]
//! base_url = "http://127.0.0.1:5000"
//! timeout_secs = 30
//! initial_balance = 1000.0
//! workers = 2
//!
//! [refresh]
//! summary_secs = 30
//! clock_secs = 1
//!
//! [logging]
//! level = "info"
//! directory = "/var/log/pairdesk"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Starting balance for every backtest run.
    pub initial_balance: f64,
    /// Size of the network worker pool.
    pub workers: usize,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            timeout_secs: 30,
            initial_balance: 1000.0,
            workers: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    pub summary_secs: u64,
    pub clock_secs: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            summary_secs: 30,
            clock_secs: 1,
        }
    }
}

impl RefreshConfig {
    pub fn summary_period(&self) -> Duration {
        Duration::from_secs(self.summary_secs)
    }

    pub fn clock_period(&self) -> Duration {
        Duration::from_secs(self.clock_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive, overridden by `RUST_LOG`.
    pub level: String,
    /// Log directory; the platform data directory when unset.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeskConfig {
    pub backend: BackendConfig,
    pub refresh: RefreshConfig,
    pub logging: LoggingConfig,
}

impl DeskConfig {
    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.workers == 0 {
            return Err(ConfigError::Invalid(
                "backend.workers must be at least 1".into(),
            ));
        }
        if self.backend.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "backend.timeout_secs must be positive".into(),
            ));
        }
        if !(self.backend.initial_balance.is_finite() && self.backend.initial_balance > 0.0) {
            return Err(ConfigError::Invalid(
                "backend.initial_balance must be positive".into(),
            ));
        }
        if self.refresh.summary_secs == 0 || self.refresh.clock_secs == 0 {
            return Err(ConfigError::Invalid(
                "refresh periods must be at least one second".into(),
            ));
        }
        Ok(())
    }
}
