//! Bizline Domain Layer
//!
//! This crate contains the core domain model for Bizline, the business-line
//! text classification service. It has ZERO external dependencies and defines
//! the value objects and trait interfaces that all other layers depend upon.
//!
//! ## Key Concepts
//!
//! - **Label**: One business line from the fixed financial-services taxonomy
//! - **ModelVariant**: The two backend models a caller may request
//! - **ClassificationOutcome**: Tagged result of a classification attempt
//!   (labeled, rejected, or busy)
//! - **Request / Feedback logs**: The durable audit trail
//!
//! ## Architecture
//!
//! - No external crate dependencies
//! - Pure domain logic only
//! - Infrastructure implementations live in other crates
//! - Trait definitions for all external interactions

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod account;
pub mod log;
pub mod model;
pub mod outcome;
pub mod request;
pub mod taxonomy;
pub mod traits;

// Re-exports for convenience
pub use account::AccountId;
pub use log::{
    now_epoch_secs, AccountCount, FeedbackLogEntry, LogSummary, NewFeedback, NewRequestLog,
    RequestCompletion, RequestLogEntry,
};
pub use model::ModelVariant;
pub use outcome::{Classification, ClassificationOutcome};
pub use request::{normalize_text, ClassificationRequest};
pub use taxonomy::{Label, TAXONOMY};
