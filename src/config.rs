//! Pipeline configuration.
//!
//! Every section is `#[serde(default)]`, so a partial JSON document only
//! overrides the fields it names.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PipelineConfig {
    pub analysis: AnalysisConfig,
    pub cost: CostConfig,
    pub generation: GenerationOptions,
}

impl PipelineConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::json("pipeline config", e))
    }
}

/// Data-flow scoring knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalysisConfig {
    /// Proximity lost per intervening action.
    pub proximity_decay: f64,
    pub proximity_floor: f64,
    /// Compatible connections weaker than this are reported as warnings.
    pub weak_connection_threshold: f64,
    pub max_suggestions: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            proximity_decay: 0.1,
            proximity_floor: 0.5,
            weak_connection_threshold: 0.5,
            max_suggestions: 3,
        }
    }
}

/// Static cost estimate constants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CostConfig {
    /// Used when an action's metadata carries no gas estimate.
    pub default_action_gas: u64,
    pub connection_gas: u64,
    pub base_time_ms: u64,
    pub per_action_time_ms: u64,
    pub per_connection_time_ms: u64,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            default_action_gas: 100,
            connection_gas: 10,
            base_time_ms: 1000,
            per_action_time_ms: 500,
            per_connection_time_ms: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerationOptions {
    /// Emit a commented stub (instead of an error) for actions without a template.
    pub enable_fallbacks: bool,
    pub include_comments: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            enable_fallbacks: true,
            include_comments: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            PipelineConfig::from_json(r#"{"analysis":{"proximityFloor":0.25},"generation":{"includeComments":false}}"#)
                .unwrap();
        assert_eq!(config.analysis.proximity_floor, 0.25);
        assert_eq!(config.analysis.proximity_decay, 0.1);
        assert!(!config.generation.include_comments);
        assert!(config.generation.enable_fallbacks);
        assert_eq!(config.cost, CostConfig::default());
    }

    #[test]
    fn invalid_json_is_a_config_error() {
        let err = PipelineConfig::from_json("{").unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse pipeline config JSON"));
    }
}
