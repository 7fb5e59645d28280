//! Account registry for credential verification.
//!
//! Accounts come from configuration; passwords are stored as hex SHA-256.

use crate::config::AccountConfig;
use bizline_domain::AccountId;
use sha2::{Digest, Sha256};
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct RegisteredAccount {
    password_sha256: String,
    account_id: AccountId,
}

/// Lookup of login names to their credentials and account
#[derive(Debug)]
pub struct AccountRegistry {
    accounts: HashMap<String, RegisteredAccount>,
}

impl AccountRegistry {
    /// Create a registry from configuration
    pub fn from_config(configs: Vec<AccountConfig>) -> Self {
        let accounts = configs
            .into_iter()
            .map(|config| {
                (
                    config.username,
                    RegisteredAccount {
                        password_sha256: config.password_sha256.to_ascii_lowercase(),
                        account_id: AccountId::new(config.account_id),
                    },
                )
            })
            .collect();

        Self { accounts }
    }

    /// Check a username and password, returning the account on success
    pub fn verify(&self, username: &str, password: &str) -> Option<AccountId> {
        let account = self.accounts.get(username)?;
        let digest = hex::encode(Sha256::digest(password.as_bytes()));
        (digest == account.password_sha256).then(|| account.account_id.clone())
    }

    /// Number of registered accounts
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether no accounts are registered
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
