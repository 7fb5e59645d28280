//! Configuration file parsing for the server.
//!
//! Loads settings from TOML files: bind address, JWT secret, token expiry,
//! log database, accounts, CORS origins and the classification backend.

use bizline_classifier::ClassifierConfig;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::path::Path;
use thiserror::Error;

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Missing required field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),

    /// A field is present but unusable
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Server configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1")
    pub bind_address: String,

    /// Bind port (e.g., 8000)
    pub bind_port: u16,

    /// JWT secret for signing tokens
    pub jwt_secret: String,

    /// Token expiry in seconds (default: 3600 = 1 hour)
    #[serde(default = "default_token_expiry")]
    pub token_expiry_secs: u64,

    /// SQLite file holding the request and feedback logs
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Account ids allowed to export and summarize the logs
    #[serde(default = "default_admin_accounts")]
    pub admin_accounts: Vec<String>,

    /// Origins allowed by CORS
    ///
    /// Defaults to the local development servers only. A hosted frontend
    /// (for example `https://ai-labeling-demo-v0-1.vercel.app`) must be
    /// listed here explicitly or its browser requests will be refused.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Classification backend
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Prompt and timeout settings for the classifier
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Accounts allowed to log in
    #[serde(default)]
    pub accounts: Vec<AccountConfig>,
}

/// OpenAI-compatible backend settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    /// API key; `OPENAI_API_KEY` in the environment takes precedence
    pub api_key: Option<String>,

    /// API base URL
    pub endpoint: String,

    /// HTTP timeout per call (seconds)
    pub request_timeout_secs: u64,

    /// Attempts per call, including the first
    pub max_retries: u32,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: bizline_llm::openai::DEFAULT_ENDPOINT.to_string(),
            request_timeout_secs: bizline_llm::openai::DEFAULT_TIMEOUT_SECS,
            max_retries: bizline_llm::openai::DEFAULT_MAX_RETRIES,
        }
    }
}

/// A login account
#[derive(Debug, Clone, Deserialize)]
pub struct AccountConfig {
    /// Login name
    pub username: String,

    /// Hex-encoded SHA-256 of the password
    pub password_sha256: String,

    /// Account the user acts as
    pub account_id: String,
}

impl AccountConfig {
    /// Build an account entry from a plaintext password
    pub fn with_password(username: &str, password: &str, account_id: &str) -> Self {
        Self {
            username: username.to_string(),
            password_sha256: hex::encode(Sha256::digest(password.as_bytes())),
            account_id: account_id.to_string(),
        }
    }
}

/// Default token expiry: 1 hour
fn default_token_expiry() -> u64 {
    3600
}

fn default_database_path() -> String {
    "logs.db".to_string()
}

fn default_admin_accounts() -> Vec<String> {
    vec!["admin".to_string()]
}

/// Local development origins only
fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
    ]
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: ServerConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::MissingField("jwt_secret".to_string()));
        }
        self.classifier.validate().map_err(ConfigError::Invalid)?;
        Ok(())
    }

    /// Take the API key from `OPENAI_API_KEY` when it is set
    pub fn apply_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            if !key.trim().is_empty() {
                self.openai.api_key = Some(key);
            }
        }
        self
    }

    /// Create a default configuration for testing
    pub fn default_test_config() -> Self {
        ServerConfig {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 8000,
            jwt_secret: "test-secret-key-do-not-use-in-production".to_string(),
            token_expiry_secs: 3600,
            database_path: default_database_path(),
            admin_accounts: default_admin_accounts(),
            cors_origins: default_cors_origins(),
            openai: OpenAiConfig::default(),
            classifier: ClassifierConfig::default(),
            accounts: vec![
                AccountConfig::with_password("admin", "admin123", "admin"),
                AccountConfig::with_password("user1", "user123", "user1"),
                AccountConfig::with_password("user2", "user456", "user2"),
                AccountConfig::with_password("user3", "user789", "user3"),
                AccountConfig::with_password("demo", "demo123", "demo"),
            ],
        }
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }
}
