//! Model variant module - the backend models a caller may choose between

use std::fmt;

/// Backend model requested for a classification
///
/// Only two variants are accepted; anything else is rejected at the
/// service boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ModelVariant {
    /// The larger, slower, more accurate model
    #[default]
    Gpt4,

    /// The smaller, faster model
    Gpt35Turbo,
}

impl ModelVariant {
    /// All accepted variants
    pub const ALL: [ModelVariant; 2] = [ModelVariant::Gpt4, ModelVariant::Gpt35Turbo];

    /// Get the backend model identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelVariant::Gpt4 => "gpt-4",
            ModelVariant::Gpt35Turbo => "gpt-3.5-turbo",
        }
    }

    /// Parse a model variant from its backend identifier
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "gpt-4" => Some(ModelVariant::Gpt4),
            "gpt-3.5-turbo" => Some(ModelVariant::Gpt35Turbo),
            _ => None,
        }
    }
}

impl fmt::Display for ModelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ModelVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            format!(
                "Model must be either '{}' or '{}'",
                ModelVariant::Gpt4,
                ModelVariant::Gpt35Turbo
            )
        })
    }
}
