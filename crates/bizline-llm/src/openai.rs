//! OpenAI Provider Implementation
//!
//! Provides integration with the OpenAI chat completions API (and any
//! compatible endpoint).
//!
//! # Features
//!
//! - Async HTTP communication with the chat completions API
//! - Configurable endpoint, timeout and API key
//! - Optional bounded retry with exponential backoff
//!
//! # Examples
//!
//! ```no_run
//! use bizline_llm::OpenAiProvider;
//!
//! let provider = OpenAiProvider::new("https://api.openai.com", Some("sk-...".to_string()));
//! ```

use crate::LlmError;
use bizline_domain::traits::{CompletionRequest, LlmProvider};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Default OpenAI API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com";

/// Default timeout for LLM requests (60 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default number of attempts per call (a single attempt, no retry)
pub const DEFAULT_MAX_RETRIES: u32 = 1;

/// OpenAI API provider
///
/// One `complete` call issues one chat completion request. Retries only happen
/// when `max_retries` is raised above one.
pub struct OpenAiProvider {
    endpoint: String,
    api_key: Option<String>,
    client: reqwest::Client,
    max_retries: u32,
}

/// Request body for the chat completions API
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Response from the chat completions API
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiProvider {
    /// Create a new OpenAI provider
    ///
    /// # Parameters
    ///
    /// - `endpoint`: API base URL (e.g., "https://api.openai.com")
    /// - `api_key`: Bearer key; `None` leaves the provider unconfigured
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self::with_timeout(endpoint, api_key, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a new OpenAI provider with a specific request timeout
    pub fn with_timeout(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            client,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Set the maximum number of attempts per call
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Issue a single chat completion request
    async fn send_once(&self, api_key: &str, request: &CompletionRequest) -> Result<String, LlmError> {
        let url = format!("{}/v1/chat/completions", self.endpoint);
        let body = ChatRequest {
            model: request.model.as_str(),
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            let parsed: ChatResponse = response
                .json()
                .await
                .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

            return parsed
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.content)
                .ok_or_else(|| LlmError::InvalidResponse("Response contained no choices".to_string()));
        }

        match status {
            reqwest::StatusCode::NOT_FOUND => Err(LlmError::ModelNotAvailable(request.model.to_string())),
            reqwest::StatusCode::TOO_MANY_REQUESTS => Err(LlmError::RateLimitExceeded),
            _ => {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                Err(LlmError::Communication(format!("HTTP {}: {}", status, error_text)))
            }
        }
    }
}

/// Whether another attempt could plausibly succeed
fn is_retryable(error: &LlmError) -> bool {
    match error {
        LlmError::Communication(message) => !message.starts_with("HTTP 4"),
        LlmError::RateLimitExceeded => true,
        _ => false,
    }
}

impl LlmProvider for OpenAiProvider {
    type Error = LlmError;

    async fn complete(&self, request: &CompletionRequest) -> Result<String, Self::Error> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| LlmError::NotConfigured("OpenAI API key not configured".to_string()))?;

        let mut attempts = 0;
        loop {
            attempts += 1;
            debug!(model = %request.model, attempt = attempts, "Sending chat completion request");

            match self.send_once(api_key, request).await {
                Ok(content) => return Ok(content),
                Err(e) if attempts < self.max_retries && is_retryable(&e) => {
                    warn!("Chat completion attempt {} failed: {}", attempts, e);
                    // Exponential backoff: 1s, 2s, 4s, etc.
                    let delay = Duration::from_secs(2u64.pow(attempts - 1));
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}
