//! Serializable pipeline configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from loading or validating a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Pipeline parameters, loadable from TOML.
///
/// Defaults mirror the historical pipeline: a 7-day volatility window and
/// correlograms out to 40 lags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Rolling volatility window, in observations.
    pub vol_window: usize,
    /// Maximum correlogram lag.
    pub max_lag: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            vol_window: 7,
            max_lag: 40,
        }
    }
}

impl PipelineConfig {
    /// Load and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Parse and validate TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.vol_window == 0 {
            return Err(ConfigError::Invalid("vol_window must be >= 1".into()));
        }
        if self.max_lag == 0 {
            return Err(ConfigError::Invalid("max_lag must be >= 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_historical_pipeline() {
        let config = PipelineConfig::default();
        assert_eq!(config.vol_window, 7);
        assert_eq!(config.max_lag, 40);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config = PipelineConfig::from_toml_str("vol_window = 14\n").unwrap();
        assert_eq!(config.vol_window, 14);
        assert_eq!(config.max_lag, 40);
    }

    #[test]
    fn zero_window_is_rejected() {
        let err = PipelineConfig::from_toml_str("vol_window = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(PipelineConfig::from_toml_str("volatility = 7\n").is_err());
    }
}
