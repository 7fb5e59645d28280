//! Bizline Classifier
//!
//! Single-flight classification of free text into the business-line taxonomy.
//!
//! # Overview
//!
//! The classification backend is slow, stateful and has no known concurrency
//! guarantees, so at most one classification runs at a time, process-wide.
//! Callers who arrive while one is running are told who holds the backend
//! and should retry later; they are never queued.
//!
//! # Architecture
//!
//! ```text
//! Request → Coordinator ─(gate held?)→ Busy
//!                │
//!                └→ Adapter → LlmProvider → Labeled | Rejected
//! ```
//!
//! # Key Features
//!
//! - **Gate**: non-blocking try-acquire with a release-on-drop guard
//! - **Adapter**: deterministic prompt (taxonomy + fixed few-shot examples)
//!   and exact-match answer normalization
//! - **Coordinator**: maps every backend result into one
//!   `ClassificationOutcome` and reports status for observability
//!
//! # Example Usage
//!
//! ```
//! use bizline_classifier::{ClassifierConfig, Coordinator};
//! use bizline_domain::{ClassificationOutcome, ClassificationRequest, ModelVariant};
//! use bizline_llm::MockProvider;
//!
//! # tokio_test::block_on(async {
//! let coordinator = Coordinator::new(
//!     MockProvider::new("Research - Equity research"),
//!     ClassifierConfig::default(),
//! );
//!
//! let request = ClassificationRequest::new(
//!     "Covered European bank stocks",
//!     ModelVariant::Gpt4,
//!     "user1",
//! );
//! let result = coordinator.classify(request).await.unwrap();
//!
//! assert!(matches!(result.outcome, ClassificationOutcome::Labeled { .. }));
//! assert!(!coordinator.status().busy);
//! # });
//! ```

#![warn(missing_docs)]

mod adapter;
mod config;
mod coordinator;
mod error;
mod gate;
mod parser;
mod prompt;
mod types;


pub use adapter::ClassifierAdapter;
pub use config::ClassifierConfig;
pub use coordinator::Coordinator;
pub use error::{ClassifierError, CoordinatorError};
pub use gate::{AcquireResult, Gate, GateGuard, GateStatus};
pub use parser::{parse_classifier_response, EMPTY_RESPONSE};
pub use prompt::PromptBuilder;
pub use types::AdapterOutput;
