use std::path::Path;

use agency_execution::ExecutorConfig;
use agency_router::RouterConfig;
use agency_validation::ValidationMode;
use serde::{Deserialize, Serialize};

use crate::error::OrchestratorError;

/// Mirrors `EscalationPolicy`'s tunables for config-file loading; the
/// allowed/fallback topology itself stays `EscalationPolicy::default_topology()`
/// since the spec's default shape is illustrative, not reconfigurable per field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EscalationPolicyConfig {
    pub max_depth: u32,
    pub history_window_secs: u64,
}

impl Default for EscalationPolicyConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            history_window_secs: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub router: RouterConfig,
    pub executor: ExecutorConfig,
    pub escalation: EscalationPolicyConfig,
    pub validation_mode: ValidationMode,
}

impl AppConfig {
    pub fn from_toml_file(path: &Path) -> Result<Self, OrchestratorError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| OrchestratorError::Config(format!("{}: {e}", path.display())))?;
        toml::from_str(&text).map_err(|e| OrchestratorError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_documented_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.router.default_agent, "locator");
        assert_eq!(config.executor.max_attempts, 3);
        assert_eq!(config.escalation.max_depth, 3);
        assert_eq!(config.validation_mode, ValidationMode::Partial);
    }

    #[test]
    fn parses_partial_toml_overrides() {
        let toml_text = r#"
            [router]
            default_agent = "analyzer"

            [executor]
            max_attempts = 5
        "#;
        let config: AppConfig = toml::from_str(toml_text).unwrap();
        assert_eq!(config.router.default_agent, "analyzer");
        assert_eq!(config.executor.max_attempts, 5);
        assert_eq!(config.escalation.max_depth, 3);
    }
}
