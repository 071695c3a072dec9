//! Mock AI Provider for testing.
//!
//! Configurable mock implementation of the AiProvider port, so pipelines
//! can be exercised without calling a real AI API.
//!
//! Responses are resolved in order: prompt-pattern rules first (needed for
//! deterministic behavior when requests run concurrently), then the
//! scripted queue, then the default response.
//!
//! # Example
//!
//! ```ignore
//! let provider = MockAiProvider::new()
//!     .respond_when("voice profile", r#"{"tone":"direct"}"#)
//!     .fail_when("aggressive", MockError::Timeout { timeout_secs: 30 });
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{AiError, AiProvider, GenerationRequest, ProviderInfo};

/// Mock AI provider for testing.
#[derive(Debug, Clone)]
pub struct MockAiProvider {
    /// Pattern rules matched against the full prompt text, in order.
    rules: Arc<Mutex<Vec<PatternRule>>>,
    /// Scripted responses consumed in order when no rule matches.
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    /// Response when rules and the queue are both exhausted.
    default_response: String,
    /// Simulated latency per request.
    delay: Duration,
    /// Call history for verification.
    calls: Arc<Mutex<Vec<GenerationRequest>>>,
}

#[derive(Debug, Clone)]
struct PatternRule {
    pattern: String,
    response: MockResponse,
}

/// A configured mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return this text.
    Success(String),
    /// Return an error.
    Error(MockError),
}

/// Mock error types for testing error handling.
#[derive(Debug, Clone)]
pub enum MockError {
    /// Simulate rate limiting.
    RateLimited { retry_after_secs: u32 },
    /// Simulate provider unavailable.
    Unavailable { message: String },
    /// Simulate authentication failure.
    AuthenticationFailed,
    /// Simulate network error.
    Network { message: String },
    /// Simulate timeout.
    Timeout { timeout_secs: u32 },
}

impl From<MockError> for AiError {
    fn from(err: MockError) -> Self {
        match err {
            MockError::RateLimited { retry_after_secs } => AiError::rate_limited(retry_after_secs),
            MockError::Unavailable { message } => AiError::unavailable(message),
            MockError::AuthenticationFailed => AiError::AuthenticationFailed,
            MockError::Network { message } => AiError::network(message),
            MockError::Timeout { timeout_secs } => AiError::Timeout { timeout_secs },
        }
    }
}

impl Default for MockAiProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAiProvider {
    /// Creates a new mock provider with default settings.
    pub fn new() -> Self {
        Self {
            rules: Arc::new(Mutex::new(Vec::new())),
            responses: Arc::new(Mutex::new(VecDeque::new())),
            default_response: "Mock response".to_string(),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns `response` whenever the prompt contains `pattern`.
    pub fn respond_when(self, pattern: impl Into<String>, response: impl Into<String>) -> Self {
        self.rules.lock().unwrap().push(PatternRule {
            pattern: pattern.into(),
            response: MockResponse::Success(response.into()),
        });
        self
    }

    /// Returns `error` whenever the prompt contains `pattern`.
    pub fn fail_when(self, pattern: impl Into<String>, error: MockError) -> Self {
        self.rules.lock().unwrap().push(PatternRule {
            pattern: pattern.into(),
            response: MockResponse::Error(error),
        });
        self
    }

    /// Adds a scripted response to the queue.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(MockResponse::Success(content.into()));
        self
    }

    /// Adds a scripted error to the queue.
    pub fn with_error(self, error: MockError) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(MockResponse::Error(error));
        self
    }

    /// Sets the response when rules and the queue are exhausted.
    pub fn with_default_response(mut self, content: impl Into<String>) -> Self {
        self.default_response = content.into();
        self
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Returns the number of calls made to this provider.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Returns all recorded calls.
    pub fn get_calls(&self) -> Vec<GenerationRequest> {
        self.calls.lock().unwrap().clone()
    }

    /// Counts recorded calls whose prompt contains `pattern`.
    pub fn calls_matching(&self, pattern: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.system_prompt.contains(pattern) || c.user_prompt.contains(pattern))
            .count()
    }

    /// Clears the call history.
    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn resolve(&self, request: &GenerationRequest) -> MockResponse {
        let rules = self.rules.lock().unwrap();
        for rule in rules.iter() {
            if request.system_prompt.contains(&rule.pattern)
                || request.user_prompt.contains(&rule.pattern)
            {
                return rule.response.clone();
            }
        }
        drop(rules);

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| MockResponse::Success(self.default_response.clone()))
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn generate(&self, request: GenerationRequest) -> Result<String, AiError> {
        let response = self.resolve(&request);
        self.calls.lock().unwrap().push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match response {
            MockResponse::Success(content) => Ok(content),
            MockResponse::Error(err) => Err(err.into()),
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("mock", "mock-model-1")
    }
}
