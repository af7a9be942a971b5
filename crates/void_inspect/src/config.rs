//! Inspector configuration
//!
//! Loaded from TOML, then overridden from the environment.
//!
//! ```toml
//! refresh_interval_ms = 3000
//! default_depth = 1
//! ```
//!
//! | Variable                  | Field                 |
//! |---------------------------|-----------------------|
//! | `VOID_INSPECT_REFRESH_MS` | `refresh_interval_ms` |
//! | `VOID_INSPECT_DEPTH`      | `default_depth`       |

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub const ENV_REFRESH_MS: &str = "VOID_INSPECT_REFRESH_MS";
pub const ENV_DEPTH: &str = "VOID_INSPECT_DEPTH";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectConfig {
    /// Milliseconds between world refreshes
    pub refresh_interval_ms: u64,
    /// Projection depth used by the component handlers
    pub default_depth: i32,
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: 3000,
            default_depth: void_reflect::DEFAULT_DEPTH,
        }
    }
}

impl InspectConfig {
    /// Parse a TOML document; missing keys take their defaults
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Override from the process environment
    pub fn apply_env(&mut self) -> ConfigResult<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Override from any key lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_REFRESH_MS) {
            self.refresh_interval_ms = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("{}={}", ENV_REFRESH_MS, value)))?;
            log::info!("Refresh interval from env: {}ms", self.refresh_interval_ms);
        }
        if let Some(value) = lookup(ENV_DEPTH) {
            self.default_depth = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("{}={}", ENV_DEPTH, value)))?;
            log::info!("Default depth from env: {}", self.default_depth);
        }
        self.validate()
    }

    /// Reject settings the inspector cannot run with
    pub fn validate(&self) -> ConfigResult<()> {
        if self.refresh_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "refresh_interval_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }
}
