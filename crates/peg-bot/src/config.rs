//! Application configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use peg_exchange::SimConfig;
use peg_strategy::StrategyConfig;

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Repricing strategy parameters.
    #[serde(default)]
    pub strategy: StrategyConfig,

    /// Paper exchange parameters.
    #[serde(default)]
    pub sim: SimConfig,
}

impl AppConfig {
    /// Load configuration from `PEG_CONFIG` or the default path, falling
    /// back to defaults when no file exists.
    pub fn load() -> AppResult<Self> {
        let config_path =
            std::env::var("PEG_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());

        if Path::new(&config_path).exists() {
            Self::from_file(&config_path)
        } else {
            tracing::warn!(path = %config_path, "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))?;

        config
            .strategy
            .validate()
            .map_err(|e| AppError::Config(e.to_string()))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.strategy.symbol, "BNBUSDT");
        assert_eq!(config.strategy.poll_interval_ms, 2000);
        assert_eq!(config.sim.seed, 42);
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("symbol"));
        assert!(toml_str.contains("band_far_depth"));
    }

    #[test]
    fn test_partial_toml_parse() {
        let config: AppConfig = toml::from_str(
            r#"
            [strategy]
            symbol = "ETHUSDT"
            poll_interval_ms = 500

            [sim]
            start_price = "2000"
            "#,
        )
        .unwrap();

        assert_eq!(config.strategy.symbol, "ETHUSDT");
        assert_eq!(config.strategy.poll_interval_ms, 500);
        assert_eq!(config.sim.start_price, dec!(2000));
        // Unspecified sections keep defaults
        assert_eq!(config.strategy.band_near_depth, 6);
    }
}
