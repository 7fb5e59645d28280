//! Log module - durable audit records of requests and feedback

use crate::{AccountId, Label, ModelVariant};

/// A request log entry as first written, before classification completes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRequestLog {
    /// Submitting account
    pub account: AccountId,
    /// Requested model
    pub model: ModelVariant,
    /// Input text as submitted
    pub input_text: String,
    /// Submission time (Unix epoch seconds)
    pub created_at: u64,
}

/// The result written back onto a request log entry
#[derive(Debug, Clone, PartialEq)]
pub struct RequestCompletion {
    /// Predicted label, if the classifier produced one
    pub predicted_label: Option<String>,
    /// Processing time in seconds
    pub processing_time: f64,
    /// Error or diagnostic text, if any
    pub error_message: Option<String>,
}

/// A persisted request log entry
#[derive(Debug, Clone, PartialEq)]
pub struct RequestLogEntry {
    /// Sequence id
    pub id: i64,
    /// Submitting account
    pub account: AccountId,
    /// Requested model name
    pub model_name: String,
    /// Input text as submitted
    pub input_text: String,
    /// Predicted label, if any
    pub predicted_label: Option<String>,
    /// Processing time in seconds, absent until the entry is completed
    pub processing_time: Option<f64>,
    /// Error or diagnostic text, if any
    pub error_message: Option<String>,
    /// Submission time (Unix epoch seconds)
    pub created_at: u64,
}

/// Feedback on a prediction, as submitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFeedback {
    /// Request log entry the feedback refers to
    pub request_id: i64,
    /// Account giving the feedback
    pub account: AccountId,
    /// Whether the prediction was acceptable
    pub is_supported: bool,
    /// Corrected label, if the caller supplied one
    pub corrected_label: Option<Label>,
    /// Submission time (Unix epoch seconds)
    pub created_at: u64,
}

/// A persisted feedback log entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackLogEntry {
    /// Sequence id
    pub id: i64,
    /// Request log entry the feedback refers to
    pub request_id: i64,
    /// Account that gave the feedback
    pub account: AccountId,
    /// Whether the prediction was acceptable
    pub is_supported: bool,
    /// Corrected label name, if any
    pub corrected_label: Option<String>,
    /// Submission time (Unix epoch seconds)
    pub created_at: u64,
}

/// Number of log entries belonging to one account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountCount {
    /// Account id
    pub account: AccountId,
    /// Entry count
    pub count: u64,
}

/// Aggregate counts across both logs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogSummary {
    /// Total request log entries
    pub total_requests: u64,
    /// Total feedback log entries
    pub total_feedback: u64,
    /// Request counts per account
    pub requests_by_account: Vec<AccountCount>,
    /// Feedback counts per account
    pub feedback_by_account: Vec<AccountCount>,
}

impl RequestLogEntry {
    /// Whether the entry belongs to the given account
    pub fn is_owned_by(&self, account: &AccountId) -> bool {
        &self.account == account
    }
}

/// Current time as Unix epoch seconds
pub fn now_epoch_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
