//! Interpret raw classifier answers

use crate::types::AdapterOutput;
use bizline_domain::Label;
use tracing::debug;

/// Diagnostic recorded when the backend answers with nothing at all
pub const EMPTY_RESPONSE: &str = "empty response from classifier";

/// Reduce a raw backend answer to an [`AdapterOutput`]
///
/// Surrounding whitespace is ignored. The remainder must equal a taxonomy
/// label exactly; there is no case folding or fuzzy matching, so near misses
/// are reported as unknown with the raw answer kept as the diagnostic.
pub fn parse_classifier_response(response: &str) -> AdapterOutput {
    let trimmed = response.trim();

    if trimmed.is_empty() {
        return AdapterOutput::Unknown {
            diagnostic: EMPTY_RESPONSE.to_string(),
        };
    }

    match Label::parse(trimmed) {
        Some(label) => AdapterOutput::Label(label),
        None => {
            debug!("Classifier answer is not a known label: {:?}", trimmed);
            AdapterOutput::Unknown {
                diagnostic: trimmed.to_string(),
            }
        }
    }
}
