//! Single-flight coordinator over the classifier adapter

use crate::adapter::ClassifierAdapter;
use crate::config::ClassifierConfig;
use crate::error::CoordinatorError;
use crate::gate::{AcquireResult, Gate, GateStatus};
use crate::types::AdapterOutput;
use bizline_domain::traits::LlmProvider;
use bizline_domain::{Classification, ClassificationOutcome, ClassificationRequest};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Serializes classification requests over one slow backend
///
/// Every call to [`classify`](Self::classify) resolves to exactly one
/// [`ClassificationOutcome`]: callers who find the gate held get `Busy` at
/// once, everyone else runs the backend and gets `Labeled` or `Rejected`.
pub struct Coordinator<P> {
    gate: Arc<Gate>,
    adapter: Arc<ClassifierAdapter<P>>,
}

impl<P> Coordinator<P>
where
    P: LlmProvider + 'static,
{
    /// Create a coordinator with its own gate
    pub fn new(provider: P, config: ClassifierConfig) -> Self {
        Self::with_gate(ClassifierAdapter::new(provider, config), Gate::new())
    }

    /// Create a coordinator over an existing adapter and gate
    pub fn with_gate(adapter: ClassifierAdapter<P>, gate: Arc<Gate>) -> Self {
        Self {
            gate,
            adapter: Arc::new(adapter),
        }
    }

    /// The gate guarding the backend
    pub fn gate(&self) -> &Arc<Gate> {
        &self.gate
    }

    /// The wrapped adapter
    pub fn adapter(&self) -> &ClassifierAdapter<P> {
        &self.adapter
    }

    /// Snapshot of who is classifying and for how long
    pub fn status(&self) -> GateStatus {
        self.gate.status()
    }

    /// Whether the backend has the credentials it needs
    pub fn is_backend_configured(&self) -> bool {
        self.adapter.is_configured()
    }

    /// Classify one request
    ///
    /// The backend call runs on its own task that owns the gate guard. The gate
    /// is therefore released exactly when the backend call finishes, whether it
    /// returns, fails or panics, and before this method returns. If the caller
    /// is dropped mid-call the task still runs to completion and then releases.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::Unexpected`] only when the backend task
    /// panics or is aborted. The gate is free again in that case too.
    pub async fn classify(
        &self,
        request: ClassificationRequest,
    ) -> Result<Classification, CoordinatorError> {
        let started = Instant::now();

        let guard = match self.gate.try_acquire(&request.account) {
            AcquireResult::Granted(guard) => guard,
            AcquireResult::Denied { owner } => {
                info!(
                    "Rejecting request from '{}': '{}' is currently classifying",
                    request.account, owner
                );
                return Ok(Classification {
                    outcome: ClassificationOutcome::Busy { owner },
                    elapsed: Duration::ZERO,
                });
            }
        };

        let text = request.normalized_text();
        let model = request.model;
        let adapter = Arc::clone(&self.adapter);

        info!(
            "Classifying for '{}' with {} ({} chars)",
            request.account,
            model,
            text.len()
        );

        let backend = tokio::spawn(async move {
            let _guard = guard;
            adapter.classify(&text, model).await
        });

        let outcome = match backend.await {
            Ok(Ok(AdapterOutput::Label(label))) => ClassificationOutcome::Labeled { label },
            Ok(Ok(AdapterOutput::Unknown { diagnostic })) => {
                info!("Classifier returned no label: {}", diagnostic);
                ClassificationOutcome::Rejected { reason: diagnostic }
            }
            Ok(Err(e)) => {
                warn!("Classification failed for '{}': {}", request.account, e);
                ClassificationOutcome::Rejected {
                    reason: format!("Labeling error: {}", e),
                }
            }
            Err(e) => {
                error!("Classification task for '{}' died: {}", request.account, e);
                let reason = if e.is_panic() {
                    "classification task panicked"
                } else {
                    "classification task was cancelled"
                };
                return Err(CoordinatorError::Unexpected(reason.to_string()));
            }
        };

        Ok(Classification {
            outcome,
            elapsed: started.elapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bizline_domain::{AccountId, Label, ModelVariant};
    use bizline_llm::MockProvider;

    fn request(account: &str, text: &str) -> ClassificationRequest {
        ClassificationRequest::new(text, ModelVariant::Gpt4, account)
    }

    #[tokio::test]
    async fn test_labeled_outcome() {
        let coordinator = Coordinator::new(
            MockProvider::new("Global Markets (including Sales & Trading) - FICC"),
            ClassifierConfig::default(),
        );

        let result = coordinator.classify(request("alice", "Traded rates swaps")).await.unwrap();
        assert_eq!(
            result.outcome,
            ClassificationOutcome::Labeled {
                label: Label::parse("Global Markets (including Sales & Trading) - FICC").unwrap()
            }
        );
        assert!(!coordinator.status().busy);
    }

    #[tokio::test]
    async fn test_unknown_answer_is_rejected_with_diagnostic() {
        let coordinator = Coordinator::new(MockProvider::new("low confidence"), ClassifierConfig::default());

        let result = coordinator.classify(request("alice", "???")).await.unwrap();
        assert_eq!(
            result.outcome,
            ClassificationOutcome::Rejected {
                reason: "low confidence".to_string()
            }
        );
        assert!(!coordinator.status().busy);
    }

    #[tokio::test]
    async fn test_backend_failure_is_rejected_and_gate_released() {
        let coordinator = Coordinator::new(MockProvider::failing("connection reset"), ClassifierConfig::default());

        let result = coordinator.classify(request("alice", "text")).await.unwrap();
        match result.outcome {
            ClassificationOutcome::Rejected { reason } => {
                assert!(reason.starts_with("Labeling error:"));
                assert!(reason.contains("connection reset"));
            }
            other => panic!("expected Rejected, got {:?}", other),
        }
        assert!(!coordinator.status().busy);
    }

    #[tokio::test]
    async fn test_backend_panic_is_unexpected_and_gate_released() {
        let coordinator = Coordinator::new(MockProvider::panicking(), ClassifierConfig::default());

        let result = coordinator.classify(request("alice", "text")).await;
        assert!(matches!(result, Err(CoordinatorError::Unexpected(_))));
        assert!(!coordinator.status().busy);
    }

    #[tokio::test]
    async fn test_held_gate_returns_busy_without_backend_call() {
        let coordinator = Coordinator::new(MockProvider::new("Research - FI research"), ClassifierConfig::default());

        let guard = match coordinator.gate().try_acquire(&AccountId::new("alice")) {
            AcquireResult::Granted(guard) => guard,
            AcquireResult::Denied { .. } => panic!("gate should be free"),
        };

        let result = coordinator.classify(request("bob", "text")).await.unwrap();
        assert_eq!(
            result.outcome,
            ClassificationOutcome::Busy {
                owner: AccountId::new("alice")
            }
        );
        assert_eq!(result.elapsed, Duration::ZERO);
        assert_eq!(coordinator.adapter().provider().call_count(), 0);

        guard.release();
        assert!(!coordinator.status().busy);
    }

    #[tokio::test]
    async fn test_text_is_normalized_before_backend() {
        let coordinator = Coordinator::new(MockProvider::new("Research - FI research"), ClassifierConfig::default());

        coordinator
            .classify(request("alice", "  Bonds\n\nand   credit "))
            .await
            .unwrap();

        let sent = coordinator.adapter().provider().last_request().unwrap();
        assert!(sent.user.ends_with("Text: Bonds and credit\nLabel:"));
        assert_eq!(sent.model, ModelVariant::Gpt4);
    }
}
