//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid AI base URL format")]
    InvalidBaseUrl,

    #[error("Temperature must be between 0.0 and 2.0")]
    InvalidTemperature,

    #[error("Max tokens must be at least 1")]
    InvalidMaxTokens,

    #[error("Concurrency limit must be at least 1")]
    InvalidConcurrencyLimit,

    #[error("Batch size must be at least 1")]
    InvalidBatchSize,

    #[error("Invalid {section} configuration: {message}")]
    InvalidSection {
        section: &'static str,
        message: String,
    },
}
