//! Configuration for the classifier

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the classifier adapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Sampling temperature passed to the backend
    pub temperature: f32,

    /// Maximum tokens the backend may generate (a label is short)
    pub max_tokens: u32,

    /// Maximum time for a single backend call (seconds)
    pub backend_timeout_secs: u64,
}

impl ClassifierConfig {
    /// Get the backend timeout as a Duration
    pub fn backend_timeout(&self) -> Duration {
        Duration::from_secs(self.backend_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err("temperature must be between 0.0 and 2.0".to_string());
        }
        if self.max_tokens == 0 {
            return Err("max_tokens must be greater than 0".to_string());
        }
        if self.backend_timeout_secs == 0 {
            return Err("backend_timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            max_tokens: 15,
            backend_timeout_secs: 120,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ClassifierConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_tokens, 15);
        assert_eq!(config.backend_timeout(), Duration::from_secs(120));
    }

    #[test]
    fn test_invalid_configs() {
        let config = ClassifierConfig {
            temperature: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ClassifierConfig {
            max_tokens: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ClassifierConfig {
            backend_timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
