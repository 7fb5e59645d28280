//! Classification request module

use crate::{AccountId, ModelVariant};

/// A single request to classify a snippet of text
///
/// Created per call and discarded once it has produced a
/// [`ClassificationOutcome`](crate::ClassificationOutcome).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRequest {
    /// Raw input text as submitted by the caller
    pub text: String,

    /// Backend model to use
    pub model: ModelVariant,

    /// Account on whose behalf the classification runs
    pub account: AccountId,
}

impl ClassificationRequest {
    /// Create a new classification request
    pub fn new(text: impl Into<String>, model: ModelVariant, account: impl Into<AccountId>) -> Self {
        Self {
            text: text.into(),
            model,
            account: account.into(),
        }
    }

    /// The request text after whitespace normalization
    pub fn normalized_text(&self) -> String {
        normalize_text(&self.text)
    }
}

/// Normalize free text before it is sent to a classifier
///
/// Trims the ends, turns embedded newlines into spaces and collapses every
/// run of whitespace into a single space.
///
/// # Examples
///
/// ```
/// use bizline_domain::normalize_text;
///
/// assert_eq!(normalize_text("  Led IPOs\n\nfor   tech  "), "Led IPOs for tech");
/// ```
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize_text("a  b\tc"), "a b c");
        assert_eq!(normalize_text("line one\nline two\r\nline three"), "line one line two line three");
        assert_eq!(normalize_text("   "), "");
        assert_eq!(normalize_text(""), "");
    }

    #[test]
    fn test_request_normalized_text() {
        let request = ClassificationRequest::new(" Covered\nequities ", ModelVariant::Gpt4, "alice");
        assert_eq!(request.normalized_text(), "Covered equities");
        assert_eq!(request.account, "alice");
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(s in "\\PC*") {
            let once = normalize_text(&s);
            prop_assert_eq!(normalize_text(&once), once.clone());
        }

        #[test]
        fn prop_normalized_has_no_newlines_or_double_spaces(s in "[a-z \\t\\r\\n]{0,64}") {
            let normalized = normalize_text(&s);
            prop_assert!(!normalized.contains('\n'));
            prop_assert!(!normalized.contains('\r'));
            prop_assert!(!normalized.contains("  "));
            prop_assert_eq!(normalized.trim(), normalized.as_str());
        }

        #[test]
        fn prop_normalize_preserves_words(words in proptest::collection::vec("[a-zA-Z0-9&]{1,8}", 0..10)) {
            let spaced = words.join(" \n\t ");
            prop_assert_eq!(normalize_text(&spaced), words.join(" "));
        }
    }
}
