//! Search configuration (time budget, depth cap, evaluation weights)

use crate::eval::EvalWeights;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Tunables for the iterative-deepening search
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// No new depth is started once this much time has elapsed
    pub min_search_time_ms: u64,
    /// Optional hard cap on depth (None keeps deepening until the budget runs out)
    pub max_depth: Option<u32>,
    /// Weights for the static evaluator
    pub weights: EvalWeights,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_search_time_ms: 100,
            max_depth: None,
            weights: EvalWeights::default(),
        }
    }
}

impl SearchConfig {
    /// Config with the given time budget and default everything else
    pub fn with_time_ms(min_search_time_ms: u64) -> Self {
        Self {
            min_search_time_ms,
            ..Default::default()
        }
    }

    /// Set a depth cap
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Set custom weights
    pub fn with_weights(mut self, weights: EvalWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn min_search_time(&self) -> Duration {
        Duration::from_millis(self.min_search_time_ms)
    }

    /// Load from JSON file; missing fields fall back to defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save as pretty JSON
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SearchConfig::default();
        assert_eq!(config.min_search_time(), Duration::from_millis(100));
        assert_eq!(config.max_depth, None);
        assert_eq!(config.weights, EvalWeights::default());
    }

    #[test]
    fn test_builders() {
        let weights = EvalWeights {
            empty: 1.0,
            ..EvalWeights::default()
        };
        let config = SearchConfig::with_time_ms(5)
            .with_max_depth(3)
            .with_weights(weights.clone());
        assert_eq!(config.min_search_time_ms, 5);
        assert_eq!(config.max_depth, Some(3));
        assert_eq!(config.weights, weights);
    }

    #[test]
    fn test_partial_json() {
        let config: SearchConfig =
            serde_json::from_str(r#"{"max_depth": 4, "weights": {"monotonicity": 2.0}}"#).unwrap();
        assert_eq!(config.min_search_time_ms, 100);
        assert_eq!(config.max_depth, Some(4));
        assert_eq!(config.weights.monotonicity, 2.0);
        assert_eq!(config.weights.empty, 2.7);
    }

    #[test]
    fn test_save_and_load() {
        let path =
            std::env::temp_dir().join(format!("tilemerge-config-{}.json", std::process::id()));
        let config = SearchConfig::with_time_ms(250).with_max_depth(6);
        config.save(&path).unwrap();
        let loaded = SearchConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(SearchConfig::load(Path::new("/nonexistent/tilemerge.json")).is_err());
    }
}
