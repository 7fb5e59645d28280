//! Bizline LLM Provider Layer
//!
//! Pluggable LLM provider implementations.
//!
//! # Architecture
//!
//! This crate provides implementations of the `LlmProvider` trait from `bizline-domain`.
//! The classifier only ever talks to a provider through that trait.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic, scriptable mock for testing
//! - `OpenAiProvider`: OpenAI-compatible chat completions API
//!
//! # Examples
//!
//! ```
//! use bizline_domain::traits::{CompletionRequest, LlmProvider};
//! use bizline_domain::ModelVariant;
//! use bizline_llm::MockProvider;
//!
//! # tokio_test::block_on(async {
//! let provider = MockProvider::new("Research - FI research");
//! let request = CompletionRequest {
//!     model: ModelVariant::Gpt4,
//!     system: "system".to_string(),
//!     user: "Text: bonds\nLabel:".to_string(),
//!     temperature: 0.2,
//!     max_tokens: 15,
//! };
//! let result = provider.complete(&request).await.unwrap();
//! assert_eq!(result, "Research - FI research");
//! # });
//! ```

#![warn(missing_docs)]

pub mod openai;

use bizline_domain::traits::{CompletionRequest, LlmProvider};
use bizline_domain::ModelVariant;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

pub use openai::OpenAiProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Provider is missing credentials or other required settings
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

#[derive(Debug, Clone)]
enum MockBehavior {
    Respond,
    Fail(String),
    Panic,
}

/// Mock LLM provider for deterministic testing
///
/// Returns pre-configured responses without making any network calls. It can
/// also sleep before answering, fail, or panic, and it records how many calls
/// overlapped so tests can check the caller's concurrency discipline.
///
/// # Examples
///
/// ```
/// use bizline_domain::ModelVariant;
/// use bizline_llm::MockProvider;
///
/// // Fixed response for every call
/// let provider = MockProvider::new("Insurance - Core insurance products");
///
/// // Per-model responses
/// let mut provider = MockProvider::default();
/// provider.add_response(ModelVariant::Gpt35Turbo, "Research - Equity research");
/// assert_eq!(provider.call_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    responses: Arc<Mutex<HashMap<ModelVariant, String>>>,
    behavior: MockBehavior,
    delay: Duration,
    configured: bool,
    last_request: Arc<Mutex<Option<CompletionRequest>>>,
    call_count: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all calls
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(HashMap::new())),
            behavior: MockBehavior::Respond,
            delay: Duration::ZERO,
            configured: true,
            last_request: Arc::new(Mutex::new(None)),
            call_count: Arc::new(AtomicUsize::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a MockProvider whose every call fails with the given message
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            behavior: MockBehavior::Fail(message.into()),
            ..Self::default()
        }
    }

    /// Create a MockProvider whose every call panics
    pub fn panicking() -> Self {
        Self {
            behavior: MockBehavior::Panic,
            ..Self::default()
        }
    }

    /// Sleep for `delay` before answering each call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Report the provider as missing its credentials
    pub fn unconfigured(mut self) -> Self {
        self.configured = false;
        self
    }

    /// Add a specific response for a given model
    pub fn add_response(&mut self, model: ModelVariant, response: impl Into<String>) {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(model, response.into());
    }

    /// Get the number of times complete was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// The most recent request passed to complete
    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.last_request
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Highest number of calls that were ever running at the same time
    pub fn max_concurrent_calls(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn response_for(&self, model: ModelVariant) -> String {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&model)
            .cloned()
            .unwrap_or_else(|| self.default_response.clone())
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

/// Decrements the in-flight counter on every exit path
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize, high_water: &AtomicUsize) -> Self {
        let now = counter.fetch_add(1, Ordering::SeqCst) + 1;
        high_water.fetch_max(now, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl LlmProvider for MockProvider {
    type Error = LlmError;

    async fn complete(&self, request: &CompletionRequest) -> Result<String, Self::Error> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap_or_else(|e| e.into_inner()) = Some(request.clone());
        let _in_flight = InFlight::enter(&self.in_flight, &self.max_in_flight);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match &self.behavior {
            MockBehavior::Respond => Ok(self.response_for(request.model)),
            MockBehavior::Fail(message) => Err(LlmError::Other(message.clone())),
            MockBehavior::Panic => panic!("mock provider panicked"),
        }
    }

    fn is_configured(&self) -> bool {
        self.configured
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(model: ModelVariant) -> CompletionRequest {
        CompletionRequest {
            model,
            system: "system".to_string(),
            user: "user".to_string(),
            temperature: 0.2,
            max_tokens: 15,
        }
    }

    #[tokio::test]
    async fn test_mock_provider_default() {
        let provider = MockProvider::new("Test response");
        let result = provider.complete(&request(ModelVariant::Gpt4)).await;
        assert_eq!(result.unwrap(), "Test response");
    }

    #[tokio::test]
    async fn test_mock_provider_per_model_responses() {
        let mut provider = MockProvider::default();
        provider.add_response(ModelVariant::Gpt35Turbo, "turbo");

        assert_eq!(
            provider.complete(&request(ModelVariant::Gpt35Turbo)).await.unwrap(),
            "turbo"
        );
        assert_eq!(
            provider.complete(&request(ModelVariant::Gpt4)).await.unwrap(),
            "Default mock response"
        );
    }

    #[tokio::test]
    async fn test_mock_provider_call_count() {
        let provider = MockProvider::new("test");
        assert_eq!(provider.call_count(), 0);

        provider.complete(&request(ModelVariant::Gpt4)).await.unwrap();
        assert_eq!(provider.call_count(), 1);
        assert_eq!(provider.last_request(), Some(request(ModelVariant::Gpt4)));

        provider.complete(&request(ModelVariant::Gpt4)).await.unwrap();
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_provider_failure() {
        let provider = MockProvider::failing("backend exploded");
        let result = provider.complete(&request(ModelVariant::Gpt4)).await;
        assert!(matches!(result, Err(LlmError::Other(ref m)) if m == "backend exploded"));
    }

    #[tokio::test]
    async fn test_mock_provider_tracks_overlap() {
        let provider = MockProvider::new("x").with_delay(Duration::from_millis(50));
        let req = request(ModelVariant::Gpt4);

        let (a, b) = tokio::join!(provider.complete(&req), provider.complete(&req));
        assert!(a.is_ok() && b.is_ok());
        assert_eq!(provider.max_concurrent_calls(), 2);
    }

    #[test]
    fn test_mock_provider_configured_flag() {
        assert!(MockProvider::default().is_configured());
        assert!(!MockProvider::default().unconfigured().is_configured());
    }

    #[tokio::test]
    async fn test_mock_provider_clone_shares_counters() {
        let provider1 = MockProvider::new("test");
        let provider2 = provider1.clone();

        provider1.complete(&request(ModelVariant::Gpt4)).await.unwrap();

        assert_eq!(provider1.call_count(), 1);
        assert_eq!(provider2.call_count(), 1);
    }
}
