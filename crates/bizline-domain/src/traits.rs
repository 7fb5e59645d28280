//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use crate::{
    FeedbackLogEntry, LogSummary, ModelVariant, NewFeedback, NewRequestLog, RequestCompletion,
    RequestLogEntry,
};
use std::future::Future;

/// Trait for the append-only request and feedback logs
///
/// Implemented by the infrastructure layer (bizline-store)
pub trait LogStore {
    /// Error type for store operations
    type Error;

    /// Write a new request log entry, returning its id
    fn record_request(&mut self, entry: NewRequestLog) -> Result<i64, Self::Error>;

    /// Write the classification result onto an existing request log entry
    fn complete_request(&mut self, id: i64, completion: RequestCompletion) -> Result<(), Self::Error>;

    /// Get a request log entry by id
    fn get_request(&self, id: i64) -> Result<Option<RequestLogEntry>, Self::Error>;

    /// Write a feedback log entry, returning its id
    fn record_feedback(&mut self, feedback: NewFeedback) -> Result<i64, Self::Error>;

    /// Get all feedback recorded against a request
    fn get_feedback(&self, request_id: i64) -> Result<Vec<FeedbackLogEntry>, Self::Error>;

    /// Aggregate counts per account
    fn summarize(&self) -> Result<LogSummary, Self::Error>;
}

/// A single chat-style completion call
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Backend model
    pub model: ModelVariant,

    /// System instructions
    pub system: String,

    /// User message
    pub user: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Upper bound on generated tokens
    pub max_tokens: u32,
}

/// Trait for LLM provider operations
///
/// Implemented by the infrastructure layer (bizline-llm)
pub trait LlmProvider: Send + Sync {
    /// Error type for LLM operations
    type Error: std::error::Error + Send + Sync + 'static;

    /// Generate a completion for the request
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send;

    /// Whether the provider has what it needs (credentials, endpoint) to run
    fn is_configured(&self) -> bool {
        true
    }
}
