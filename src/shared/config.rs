use std::fs;
use serde::{Deserialize, Serialize};
use crate::shared::errors::EngineError;

/// Engine tuning parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Minimum yield improvement (percentage points) for a rebalance
    pub min_yield_improvement: f64,
    /// Maximum tolerated risk-score increase for a rebalance
    pub max_risk_increase: f64,
    /// Confidence a candidate must reach before the optimizer proposes it
    pub confidence_threshold: f64,
    /// Delegation grant cache time-to-live
    pub grant_ttl_secs: u64,
    /// Default number of ranked recommendations returned
    pub recommendation_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_yield_improvement: 0.5,
            max_risk_increase: 0.2,
            confidence_threshold: 0.8,
            grant_ttl_secs: 300,
            recommendation_limit: 5,
        }
    }
}

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from Config.toml
    pub fn load_config() -> Result<EngineConfig, EngineError> {
        let config_content = fs::read_to_string("Config.toml")
            .map_err(|e| EngineError::ConfigError(format!("Failed to read config file: {}", e)))?;

        let config: EngineConfig = toml::from_str(&config_content)
            .map_err(|e| EngineError::ConfigError(format!("Failed to parse config file: {}", e)))?;

        Ok(config)
    }
}
