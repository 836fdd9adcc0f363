//! Session tokens issued by the identity service
//!
//! Tokens are HS256 JWTs signed with a secret shared between the identity
//! service and blog-service. `sub` carries the numeric user id.

use anyhow::{anyhow, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

/// Session lifetime used by `issue`
const SESSION_EXPIRY_HOURS: i64 = 24 * 14;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (numeric user id as a string)
    pub sub: String,
    pub username: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    pub fn user_id(&self) -> Result<i64> {
        self.sub
            .parse()
            .map_err(|e| anyhow!("Invalid user id in token: {e}"))
    }
}

#[derive(Clone)]
pub struct TokenVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Sign a session token for a user
    pub fn issue(&self, user_id: i64, username: &str) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(SESSION_EXPIRY_HOURS)).timestamp(),
        };

        encode(&Header::new(JWT_ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| anyhow!("Failed to issue session token: {e}"))
    }

    /// Check signature and expiry
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.validate_exp = true;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| anyhow!("Token validation failed: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_then_verify() {
        let verifier = TokenVerifier::new("test-secret");
        let token = verifier.issue(7, "leo").unwrap();
        let claims = verifier.verify(&token).unwrap();

        assert_eq!(claims.user_id().unwrap(), 7);
        assert_eq!(claims.username, "leo");
    }

    #[test]
    fn test_rejects_foreign_signature_and_garbage() {
        let token = TokenVerifier::new("one").issue(1, "a").unwrap();
        assert!(TokenVerifier::new("two").verify(&token).is_err());
        assert!(TokenVerifier::new("one").verify("not-a-token").is_err());
    }

    #[test]
    fn test_rejects_expired_token() {
        let verifier = TokenVerifier::new("secret");
        let claims = Claims {
            sub: "1".into(),
            username: "a".into(),
            iat: 0,
            exp: 1,
        };
        let token = encode(&Header::new(JWT_ALGORITHM), &claims, &verifier.encoding_key).unwrap();
        assert!(verifier.verify(&token).is_err());
    }
}
