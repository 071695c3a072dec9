//! Batch orchestrator configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Batch processing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OrchestratorConfig {
    /// Maximum in-flight subscriber personalizations per batch
    #[serde(default = "default_concurrency_limit")]
    pub concurrency_limit: usize,
}

impl OrchestratorConfig {
    /// Validate orchestrator configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.concurrency_limit == 0 {
            return Err(ValidationError::InvalidConcurrencyLimit);
        }
        Ok(())
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            concurrency_limit: default_concurrency_limit(),
        }
    }
}

fn default_concurrency_limit() -> usize {
    10
}
