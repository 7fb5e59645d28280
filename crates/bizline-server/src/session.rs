//! Session management with JWT tokens.
//!
//! A successful login yields a signed bearer token carrying the username and
//! the account it acts as. Every authenticated route validates it.

use bizline_domain::{now_epoch_secs, AccountId};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Session management error
#[derive(Debug, Error)]
pub enum SessionError {
    /// JWT encoding failed
    #[error("Failed to encode JWT: {0}")]
    JwtEncode(#[from] jsonwebtoken::errors::Error),

    /// Token expired
    #[error("Session token expired")]
    TokenExpired,

    /// Invalid token
    #[error("Invalid session token")]
    InvalidToken,
}

/// JWT claims for session tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Username that logged in
    pub sub: String,

    /// Account the user acts as
    pub account_id: String,

    /// Token expiration timestamp (Unix epoch)
    pub exp: u64,

    /// Issued at timestamp (Unix epoch)
    pub iat: u64,
}

impl SessionClaims {
    /// The account carried by the token
    pub fn account(&self) -> AccountId {
        AccountId::new(self.account_id.clone())
    }
}

/// Login response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// JWT session token
    pub access_token: String,

    /// Always "bearer"
    pub token_type: String,

    /// Account the user acts as
    pub account_id: String,
}

impl LoginResponse {
    /// Wrap a freshly issued token
    pub fn bearer(access_token: String, account: &AccountId) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
            account_id: account.to_string(),
        }
    }
}

/// Session manager handles JWT token generation and validation
pub struct SessionManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry_secs: u64,
}

impl SessionManager {
    /// Create a new session manager with the given JWT secret and expiry
    pub fn new(jwt_secret: &str, token_expiry_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            token_expiry_secs,
        }
    }

    /// Generate a new session token for the given user
    pub fn generate_token(&self, username: &str, account: &AccountId) -> Result<String, SessionError> {
        let now = now_epoch_secs();

        let claims = SessionClaims {
            sub: username.to_string(),
            account_id: account.to_string(),
            exp: now + self.token_expiry_secs,
            iat: now,
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Validate a session token and extract claims
    pub fn validate_token(&self, token: &str) -> Result<SessionClaims, SessionError> {
        let validation = Validation::default();
        let token_data = decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => SessionError::TokenExpired,
                _ => SessionError::InvalidToken,
            })?;

        Ok(token_data.claims)
    }

    /// Validate the value of an `Authorization` header
    ///
    /// Accepts `Bearer <token>` as well as a bare token.
    pub fn validate_header(&self, header: &str) -> Result<SessionClaims, SessionError> {
        let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();
        if token.is_empty() {
            return Err(SessionError::InvalidToken);
        }
        self.validate_token(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_and_validate_token() {
        let manager = SessionManager::new("test-secret", 3600);
        let token = manager.generate_token("user1", &AccountId::new("acct-1")).unwrap();

        let claims = manager.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "user1");
        assert_eq!(claims.account(), AccountId::new("acct-1"));
        assert_eq!(claims.exp, claims.iat + 3600);
    }

    #[test]
    fn test_expired_token() {
        let manager = SessionManager::new("test-secret", 3600);

        // Create a token that's already expired (exp in the past)
        let now = now_epoch_secs();
        let claims = SessionClaims {
            sub: "user1".to_string(),
            account_id: "user1".to_string(),
            exp: now - 100,
            iat: now - 200,
        };

        let token = encode(&Header::default(), &claims, &manager.encoding_key).unwrap();

        let result = manager.validate_token(&token);
        assert!(matches!(result, Err(SessionError::TokenExpired)));
    }

    #[test]
    fn test_invalid_token() {
        let manager = SessionManager::new("test-secret", 3600);
        let result = manager.validate_token("invalid-token");
        assert!(matches!(result, Err(SessionError::InvalidToken)));
    }

    #[test]
    fn test_wrong_secret() {
        let manager1 = SessionManager::new("secret1", 3600);
        let manager2 = SessionManager::new("secret2", 3600);

        let token = manager1.generate_token("user1", &AccountId::new("user1")).unwrap();
        let result = manager2.validate_token(&token);
        assert!(matches!(result, Err(SessionError::InvalidToken)));
    }

    #[test]
    fn test_header_forms() {
        let manager = SessionManager::new("test-secret", 3600);
        let token = manager.generate_token("user1", &AccountId::new("user1")).unwrap();

        assert!(manager.validate_header(&format!("Bearer {}", token)).is_ok());
        assert!(manager.validate_header(&token).is_ok());
        assert!(matches!(
            manager.validate_header("Bearer "),
            Err(SessionError::InvalidToken)
        ));
    }

    #[test]
    fn test_login_response() {
        let response = LoginResponse::bearer("tok".to_string(), &AccountId::new("user2"));
        assert_eq!(response.token_type, "bearer");
        assert_eq!(response.account_id, "user2");
    }
}
