//! Classifier adapter: one backend call per classification

use crate::config::ClassifierConfig;
use crate::error::ClassifierError;
use crate::parser::parse_classifier_response;
use crate::prompt::PromptBuilder;
use crate::types::AdapterOutput;
use bizline_domain::traits::{CompletionRequest, LlmProvider};
use bizline_domain::ModelVariant;
use tokio::time::timeout;
use tracing::debug;

/// Wraps an LLM provider behind the classification contract
///
/// Builds the prompt from the taxonomy, makes exactly one provider call and
/// normalizes the answer. Retries, if any, are the provider's business.
pub struct ClassifierAdapter<P> {
    provider: P,
    config: ClassifierConfig,
}

impl<P: LlmProvider> ClassifierAdapter<P> {
    /// Create a new adapter
    pub fn new(provider: P, config: ClassifierConfig) -> Self {
        Self { provider, config }
    }

    /// The wrapped provider
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// The adapter configuration
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Whether the provider is able to run at all
    pub fn is_configured(&self) -> bool {
        self.provider.is_configured()
    }

    /// Build the completion request for already-normalized text
    pub fn completion_request(&self, text: &str, model: ModelVariant) -> CompletionRequest {
        let prompt = PromptBuilder::new(text);
        CompletionRequest {
            model,
            system: prompt.system_message(),
            user: prompt.user_message(),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        }
    }

    /// Classify already-normalized text
    ///
    /// # Errors
    ///
    /// Returns an error if the provider fails or the call times out. An answer
    /// that is not a label is not an error; it comes back as
    /// [`AdapterOutput::Unknown`].
    pub async fn classify(
        &self,
        text: &str,
        model: ModelVariant,
    ) -> Result<AdapterOutput, ClassifierError> {
        let request = self.completion_request(text, model);
        debug!(
            model = %model,
            "Prompt length: {} chars",
            request.system.len() + request.user.len()
        );

        let response = timeout(self.config.backend_timeout(), self.provider.complete(&request))
            .await
            .map_err(|_| ClassifierError::Timeout(self.config.backend_timeout_secs))?
            .map_err(|e| ClassifierError::Llm(e.to_string()))?;

        Ok(parse_classifier_response(&response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bizline_llm::MockProvider;
    use std::time::Duration;

    #[tokio::test]
    async fn test_adapter_returns_label() {
        let adapter = ClassifierAdapter::new(
            MockProvider::new("Insurance - Core insurance products"),
            ClassifierConfig::default(),
        );

        let output = adapter.classify("Sold life policies", ModelVariant::Gpt4).await.unwrap();
        assert!(matches!(output, AdapterOutput::Label(l) if l.name() == "Insurance - Core insurance products"));
        assert_eq!(adapter.provider().call_count(), 1);
    }

    #[tokio::test]
    async fn test_adapter_unknown_answer() {
        let adapter = ClassifierAdapter::new(MockProvider::new("I am not sure"), ClassifierConfig::default());

        let output = adapter.classify("???", ModelVariant::Gpt35Turbo).await.unwrap();
        assert_eq!(
            output,
            AdapterOutput::Unknown {
                diagnostic: "I am not sure".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_adapter_propagates_provider_failure() {
        let adapter = ClassifierAdapter::new(MockProvider::failing("boom"), ClassifierConfig::default());

        let result = adapter.classify("text", ModelVariant::Gpt4).await;
        assert!(matches!(result, Err(ClassifierError::Llm(ref m)) if m.contains("boom")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_adapter_timeout() {
        let config = ClassifierConfig {
            backend_timeout_secs: 1,
            ..Default::default()
        };
        let adapter = ClassifierAdapter::new(
            MockProvider::new("Research - FI research").with_delay(Duration::from_secs(5)),
            config,
        );

        let result = adapter.classify("text", ModelVariant::Gpt4).await;
        assert!(matches!(result, Err(ClassifierError::Timeout(1))));
    }

    #[test]
    fn test_completion_request_uses_config() {
        let config = ClassifierConfig {
            temperature: 0.5,
            max_tokens: 20,
            ..Default::default()
        };
        let adapter = ClassifierAdapter::new(MockProvider::default(), config);

        let request = adapter.completion_request("Ran treasury ops", ModelVariant::Gpt35Turbo);
        assert_eq!(request.model, ModelVariant::Gpt35Turbo);
        assert_eq!(request.temperature, 0.5);
        assert_eq!(request.max_tokens, 20);
        assert!(request.user.ends_with("Text: Ran treasury ops\nLabel:"));
    }
}
