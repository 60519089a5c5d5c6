use crate::ai::dependencies::DependencyTable;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid AI config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid AI config: {0}")]
    Invalid(String),
}

/// Tuning constants of the high-level AI.
///
/// Every field has a default, so a config file only needs to list what it changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Bearers kept in reserve; none are converted to specialists below this.
    pub minimum_bearers: u32,
    /// Bearers each building is expected to keep busy.
    pub bearers_per_house: u32,
    /// Exhausted stone-cutters look for stones up to `work_radius * factor` away.
    pub stonecutter_work_radius_factor: u32,
    /// Extra building weight of a weaponsmith when estimating bearer demand.
    pub weaponsmith_factor: f32,
    /// Pioneers sent to a resource target in one batch.
    pub resource_pioneer_group: usize,
    /// Pioneers broadening the territory.
    pub broaden_pioneer_group: usize,
    /// Lumberjacks per pioneer when sizing the pioneer pool.
    pub lumberjack_to_pioneer_ratio: f32,
    /// Ticks before the broaden target is recomputed without new pioneers.
    pub broaden_refresh_period: u32,
    /// Gold units one stock holds.
    pub stock_capacity: u32,
    /// Gold allowed above the stock capacity before building another stock.
    pub stock_slack: u32,
    /// Soldiers closer than this (grid distance) are assumed able to garrison unaided.
    pub tower_search_radius: u32,
    pub dependencies: DependencyTable,
}

impl Default for AiConfig {
    fn default() -> Self {
        let resource_pioneer_group = 15;
        let broaden_pioneer_group = 60;
        Self {
            minimum_bearers: 10,
            bearers_per_house: 3,
            stonecutter_work_radius_factor: 2,
            weaponsmith_factor: 7.0,
            resource_pioneer_group,
            broaden_pioneer_group,
            lumberjack_to_pioneer_ratio: 8.0
                / (resource_pioneer_group + broaden_pioneer_group) as f32,
            broaden_refresh_period: 25,
            stock_capacity: 6 * 8,
            stock_slack: 32,
            tower_search_radius: 40,
            dependencies: DependencyTable::default(),
        }
    }
}

impl AiConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: AiConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Largest pioneer pool the AI maintains.
    pub fn max_pioneers(&self) -> usize {
        self.resource_pioneer_group + self.broaden_pioneer_group
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.lumberjack_to_pioneer_ratio.is_nan() || self.lumberjack_to_pioneer_ratio <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "lumberjack_to_pioneer_ratio must be positive, got {}",
                self.lumberjack_to_pioneer_ratio
            )));
        }
        if let Some(dep) = self.dependencies.entries().iter().find(|d| d.ratio < 0.0) {
            return Err(ConfigError::Invalid(format!(
                "negative ratio {} for {} -> {}",
                dep.ratio, dep.required, dep.dependent
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AiConfig::default();
        assert_eq!(config.minimum_bearers, 10);
        assert_eq!(config.max_pioneers(), 75);
        assert_eq!(config.stock_capacity, 48);
        assert!((config.lumberjack_to_pioneer_ratio - 8.0 / 75.0).abs() < 1e-6);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = AiConfig::from_json_str(r#"{ "minimum_bearers": 4 }"#).unwrap();
        assert_eq!(config.minimum_bearers, 4);
        assert_eq!(config.broaden_refresh_period, 25);
        assert!(!config.dependencies.entries().is_empty());
    }

    #[test]
    fn test_rejects_zero_pioneer_ratio() {
        let err = AiConfig::from_json_str(r#"{ "lumberjack_to_pioneer_ratio": 0.0 }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_nan_and_negative_pioneer_ratio() {
        for ratio in [f32::NAN, -1.0] {
            let config = AiConfig {
                lumberjack_to_pioneer_ratio: ratio,
                ..Default::default()
            };
            assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        }
        assert!(AiConfig::default().validate().is_ok());
    }

    #[test]
    fn test_load_missing_file() {
        let err = AiConfig::load(Path::new("/nonexistent/ai.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/ai.json"));
    }
}
