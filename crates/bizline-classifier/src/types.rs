//! Types produced by the classifier adapter

use bizline_domain::Label;

/// Normalized result of one backend call
///
/// The backend's free-form answer is reduced to either a taxonomy label or
/// the unknown case; nothing else crosses the adapter boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterOutput {
    /// The backend answered with a taxonomy label, verbatim
    Label(Label),

    /// The backend answered with anything else
    Unknown {
        /// The raw answer (or a description of its absence)
        diagnostic: String,
    },
}
