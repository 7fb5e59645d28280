//! Error types for the classifier

use thiserror::Error;

/// Errors raised by the classifier adapter
///
/// These never leave the coordinator: it folds them into a
/// `ClassificationOutcome::Rejected`.
#[derive(Error, Debug)]
pub enum ClassifierError {
    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(String),

    /// The backend call exceeded the configured timeout
    #[error("Classifier timed out after {0} seconds")]
    Timeout(u64),
}

/// Errors that escape the coordinator
///
/// Expected results (labeled, rejected, busy) are values, not errors. Only a
/// protected section that dies without producing a value ends up here.
#[derive(Error, Debug)]
pub enum CoordinatorError {
    /// The protected section panicked or was aborted
    #[error("Unexpected failure in classification: {0}")]
    Unexpected(String),
}
