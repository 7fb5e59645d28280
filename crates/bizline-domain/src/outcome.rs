//! Outcome module - the uniform result contract of a classification attempt

use crate::{AccountId, Label};
use std::time::Duration;

/// Result of a classification attempt
///
/// Exactly one shape applies to any attempt:
/// - `Labeled`: the classifier returned a taxonomy label
/// - `Rejected`: the classifier could not or did not produce a label
/// - `Busy`: another account holds the gate, the backend was not called
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassificationOutcome {
    /// The classifier produced a label from the taxonomy
    Labeled {
        /// The predicted label
        label: Label,
    },

    /// The classifier declined or failed; `reason` carries the diagnostic
    Rejected {
        /// Diagnostic text for the request log
        reason: String,
    },

    /// The gate is held by another account
    Busy {
        /// Account currently holding the gate
        owner: AccountId,
    },
}

impl ClassificationOutcome {
    /// The predicted label, if any
    pub fn predicted_label(&self) -> Option<Label> {
        match self {
            ClassificationOutcome::Labeled { label } => Some(*label),
            _ => None,
        }
    }

    /// Error text to record for this outcome, if any
    pub fn error_message(&self) -> Option<String> {
        match self {
            ClassificationOutcome::Labeled { .. } => None,
            ClassificationOutcome::Rejected { reason } => Some(reason.clone()),
            ClassificationOutcome::Busy { owner } => Some(format!(
                "System is busy. User '{}' is currently processing a request.",
                owner
            )),
        }
    }

    /// Whether the attempt was turned away because the gate was held
    pub fn is_busy(&self) -> bool {
        matches!(self, ClassificationOutcome::Busy { .. })
    }
}

/// An outcome together with the time it took to produce
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// What happened
    pub outcome: ClassificationOutcome,

    /// Wall-clock time spent, zero when the caller was turned away
    pub elapsed: Duration,
}

impl Classification {
    /// Elapsed time in fractional seconds
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TAXONOMY;

    #[test]
    fn test_labeled_outcome() {
        let outcome = ClassificationOutcome::Labeled { label: TAXONOMY[3] };
        assert_eq!(outcome.predicted_label(), Some(TAXONOMY[3]));
        assert_eq!(outcome.error_message(), None);
        assert!(!outcome.is_busy());
    }

    #[test]
    fn test_rejected_outcome() {
        let outcome = ClassificationOutcome::Rejected {
            reason: "low confidence".to_string(),
        };
        assert_eq!(outcome.predicted_label(), None);
        assert_eq!(outcome.error_message().as_deref(), Some("low confidence"));
    }

    #[test]
    fn test_busy_outcome_names_owner() {
        let outcome = ClassificationOutcome::Busy {
            owner: AccountId::new("alice"),
        };
        assert!(outcome.is_busy());
        let message = outcome.error_message().unwrap();
        assert!(message.contains("busy"));
        assert!(message.contains("'alice'"));
    }
}
