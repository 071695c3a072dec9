//! HTTP AI Provider - Implementation of AiProvider for chat-completions APIs.
//!
//! Targets any OpenAI-compatible chat completions endpoint. Only
//! single-shot (non-streaming) generation is supported; the engine's
//! pipelines consume complete responses.
//!
//! Retryable failures (rate limits, timeouts, 5xx, network errors) are
//! retried with exponential backoff up to the configured limit.

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

use crate::config::AiConfig;
use crate::ports::{AiError, AiProvider, GenerationRequest, ProviderInfo};

/// Chat-completions API provider implementation.
pub struct HttpAiProvider {
    config: AiConfig,
    client: Client,
}

impl HttpAiProvider {
    /// Creates a new provider from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AiError::InvalidRequest`] if no API key is configured or
    /// the HTTP client cannot be constructed.
    pub fn new(config: AiConfig) -> Result<Self, AiError> {
        if !config.has_api_key() {
            return Err(AiError::InvalidRequest(
                "API key required for HTTP provider".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| AiError::InvalidRequest(format!("HTTP client build failed: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Builds the chat completions endpoint URL.
    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    fn to_chat_request(&self, request: &GenerationRequest) -> ChatRequest {
        ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: request.system_prompt.clone(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: request.user_prompt.clone(),
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }

    async fn send_request(&self, request: &GenerationRequest) -> Result<Response, AiError> {
        let api_key = match self.config.api_key.as_ref() {
            Some(key) => key.expose_secret().clone(),
            None => return Err(AiError::AuthenticationFailed),
        };

        self.client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&self.to_chat_request(request))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AiError::Timeout {
                        timeout_secs: self.config.timeout_secs as u32,
                    }
                } else if e.is_connect() {
                    AiError::network(format!("Connection failed: {}", e))
                } else {
                    AiError::network(e.to_string())
                }
            })
    }

    /// Maps non-success statuses to errors.
    async fn handle_response_status(&self, response: Response) -> Result<Response, AiError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();

        match status.as_u16() {
            401 => Err(AiError::AuthenticationFailed),
            429 => Err(AiError::rate_limited(Self::parse_retry_after(&error_body))),
            400 => Err(AiError::InvalidRequest(error_body)),
            500..=599 => Err(AiError::unavailable(format!(
                "Server error {}: {}",
                status, error_body
            ))),
            _ => Err(AiError::network(format!(
                "Unexpected status {}: {}",
                status, error_body
            ))),
        }
    }

    /// Parses retry-after seconds from an error body, defaulting to 30.
    fn parse_retry_after(error_body: &str) -> u32 {
        if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(error_body) {
            if let Some(s) = parsed
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
            {
                if let Some(idx) = s.find("try again in ") {
                    let rest = &s[idx + 13..];
                    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
                    if let Ok(secs) = digits.parse::<u32>() {
                        return secs;
                    }
                }
            }
        }
        30
    }

    async fn parse_response(&self, response: Response) -> Result<String, AiError> {
        let response = self.handle_response_status(response).await?;

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| AiError::parse(format!("Failed to parse response: {}", e)))?;

        let choice = chat_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AiError::parse("No choices in response"))?;

        Ok(choice.message.content)
    }
}

#[async_trait]
impl AiProvider for HttpAiProvider {
    async fn generate(&self, request: GenerationRequest) -> Result<String, AiError> {
        let mut last_error = AiError::network("No attempts made");
        let mut retry_count = 0;

        while retry_count <= self.config.max_retries {
            let result = match self.send_request(&request).await {
                Ok(response) => self.parse_response(response).await,
                Err(err) => Err(err),
            };

            match result {
                Ok(text) => return Ok(text),
                Err(err) => {
                    if !err.is_retryable() || retry_count >= self.config.max_retries {
                        return Err(err);
                    }
                    warn!(
                        error = %err,
                        attempt = retry_count + 1,
                        "AI request failed, retrying"
                    );
                    last_error = err;
                }
            }

            // Exponential backoff: 1s, 2s, 4s, ...
            let delay = Duration::from_secs(1 << retry_count);
            sleep(delay).await;
            retry_count += 1;
        }

        Err(last_error)
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("http", self.config.model.clone())
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}
