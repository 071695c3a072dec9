//! AI Provider Port - Interface for text-generation provider integrations.
//!
//! Abstracts the external AI service used for voice analysis and content
//! adaptation. The engine only ever needs single-shot structured-text
//! generation; callers must treat provider failures as recoverable (every
//! pipeline stage has a documented fallback).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Port for AI text generation.
#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Generates a single completion for the given request.
    ///
    /// The returned text is expected, not guaranteed, to follow the format
    /// requested in the prompt; parsing with fallbacks is the caller's
    /// responsibility.
    async fn generate(&self, request: GenerationRequest) -> Result<String, AiError>;

    /// Provider name and model, for logging.
    fn provider_info(&self) -> ProviderInfo;
}

/// A single generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// System prompt guiding model behavior.
    pub system_prompt: String,
    /// User prompt with the task and content.
    pub user_prompt: String,
    /// Response randomness (0.0 deterministic, 1.0+ creative).
    pub temperature: f32,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
}

impl GenerationRequest {
    /// Creates a request with the default temperature (0.7) and token
    /// budget (1024).
    pub fn new(system_prompt: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
            temperature: 0.7,
            max_tokens: 1024,
        }
    }

    /// Sets the temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the maximum tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Provider information for logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Provider name (e.g., "openai", "mock").
    pub name: String,
    /// Model identifier.
    pub model: String,
}

impl ProviderInfo {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
        }
    }
}

/// AI provider errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AiError {
    /// Rate limited by provider.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u32 },

    /// Request timed out.
    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u32 },

    /// Provider is unavailable.
    #[error("provider unavailable: {message}")]
    Unavailable { message: String },

    /// API key or authentication failed.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Network error during request.
    #[error("network error: {0}")]
    Network(String),

    /// Failed to parse provider response envelope.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid request configuration.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl AiError {
    /// Creates a rate limited error.
    pub fn rate_limited(retry_after_secs: u32) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Returns true if retrying the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AiError::RateLimited { .. }
                | AiError::Timeout { .. }
                | AiError::Unavailable { .. }
                | AiError::Network(_)
        )
    }
}
