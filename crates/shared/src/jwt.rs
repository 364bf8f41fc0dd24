//! JWT session tokens (HS256).
//!
//! Login issues a short-lived access token; routes that require an
//! authenticated actor validate it with [`JwtKeys::decode`]. Tokens minted
//! before a user's forced-invalidation timestamp are rejected at the route
//! layer by comparing against the `iat` claim.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Error type for JWT operations.
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingError(String),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,
}

/// JWT token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: String,
    /// Access level of the user at the time of login.
    pub nivel: String,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
    /// Issued at (Unix timestamp).
    pub iat: i64,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid, JwtError> {
        Uuid::parse_str(&self.sub).map_err(|_| JwtError::InvalidToken)
    }
}

/// Symmetric signing/validation keys derived from the configured secret.
#[derive(Clone)]
pub struct JwtKeys {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    /// Token lifetime in seconds.
    pub expiry_secs: i64,
}

impl std::fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtKeys")
            .field("expiry_secs", &self.expiry_secs)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl JwtKeys {
    pub fn new(secret: &str, expiry_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry_secs,
        }
    }

    /// Issues an access token for the given user.
    pub fn issue(&self, user_id: Uuid, nivel: &str) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            nivel: nivel.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.expiry_secs)).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))
    }

    /// Decodes and validates a token, returning its claims.
    pub fn decode(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 30;
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                _ => JwtError::InvalidToken,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> JwtKeys {
        JwtKeys::new("segredo-de-teste", 3600)
    }

    #[test]
    fn test_issue_and_decode_roundtrip() {
        let keys = keys();
        let user_id = Uuid::new_v4();
        let token = keys.issue(user_id, "admin").unwrap();
        let claims = keys.decode(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.nivel, "admin");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_decode_rejects_wrong_secret() {
        let token = keys().issue(Uuid::new_v4(), "tecnico").unwrap();
        let other = JwtKeys::new("outro-segredo", 3600);
        assert!(matches!(other.decode(&token), Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_decode_rejects_expired_token() {
        // Negative expiry puts exp in the past, beyond the 30s leeway.
        let keys = JwtKeys::new("segredo-de-teste", -120);
        let token = keys.issue(Uuid::new_v4(), "admin").unwrap();
        assert!(matches!(keys.decode(&token), Err(JwtError::TokenExpired)));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            keys().decode("nem.um.jwt"),
            Err(JwtError::InvalidToken)
        ));
    }
}
