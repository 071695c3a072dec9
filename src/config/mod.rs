//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Configuration is loaded with the
//! `AUDIENCECRAFT` prefix and nested values use `__` as separator.
//!
//! # Example
//!
//! ```no_run
//! use audiencecraft::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod ai;
mod error;
mod orchestrator;

pub use ai::AiConfig;
pub use error::{ConfigError, ValidationError};
pub use orchestrator::OrchestratorConfig;

use serde::Deserialize;

use crate::domain::cohort::SegmentationConfig;
use crate::domain::prediction::PredictionConfig;

/// Root application configuration
///
/// Every section has complete defaults, so an empty environment yields a
/// working configuration (mock AI provider, built-in thresholds).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// AI provider configuration
    #[serde(default)]
    pub ai: AiConfig,

    /// Cohort segmentation thresholds
    #[serde(default)]
    pub segmentation: SegmentationConfig,

    /// Predictive scoring weights and thresholds
    #[serde(default)]
    pub prediction: PredictionConfig,

    /// Batch processing configuration
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Loads a `.env` file if present, then reads environment variables
    /// with the `AUDIENCECRAFT` prefix:
    ///
    /// - `AUDIENCECRAFT__AI__MODEL=gpt-4o` -> `ai.model = gpt-4o`
    /// - `AUDIENCECRAFT__ORCHESTRATOR__CONCURRENCY_LIMIT=4`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into their
    /// expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("AUDIENCECRAFT")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration sections
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first invalid value found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.ai.validate()?;
        self.orchestrator.validate()?;
        self.segmentation
            .validate()
            .map_err(|message| ValidationError::InvalidSection {
                section: "segmentation",
                message,
            })?;
        self.prediction
            .validate()
            .map_err(|message| ValidationError::InvalidSection {
                section: "prediction",
                message,
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_values_override_defaults() {
        std::env::set_var("AUDIENCECRAFT__ORCHESTRATOR__CONCURRENCY_LIMIT", "4");
        std::env::set_var("AUDIENCECRAFT__AI__MODEL", "gpt-4o");

        let config = AppConfig::load().unwrap();

        assert_eq!(config.orchestrator.concurrency_limit, 4);
        assert_eq!(config.ai.model, "gpt-4o");
        assert!(config.validate().is_ok());

        std::env::remove_var("AUDIENCECRAFT__ORCHESTRATOR__CONCURRENCY_LIMIT");
        std::env::remove_var("AUDIENCECRAFT__AI__MODEL");
    }

    #[test]
    fn test_invalid_section_reported_by_name() {
        let mut config = AppConfig::default();
        config.segmentation.min_cohort_size = 0;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("segmentation"));
    }
}
