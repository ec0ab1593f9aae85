//! Signed session tokens.
//!
//! Tokens are HS256 JWTs carrying the user ID and role. They are stateless:
//! the server keeps no record of issued tokens, so a token stays valid until
//! it expires even if the user's role changes.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use paradise_core::{Role, UserId};

use super::TokenError;
use crate::models::CurrentUser;

/// JWT claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID as a decimal string.
    pub sub: String,
    pub role: Role,
    /// Issued at (seconds since epoch).
    pub iat: i64,
    /// Expiry (seconds since epoch).
    pub exp: i64,
}

/// Issues and verifies session tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Create a token service from a shared secret.
    #[must_use]
    pub fn new(secret: &SecretString, ttl: Duration) -> Self {
        let key = secret.expose_secret().as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(key),
            decoding: DecodingKey::from_secret(key),
            validation,
            ttl,
        }
    }

    /// Issue a token for a user.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if the token cannot be encoded.
    pub fn issue(&self, user_id: UserId, role: Role) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = Claims {
            sub: user_id.to_string(),
            role,
            iat: now,
            exp: now.saturating_add(ttl),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify a token and return the identity it carries.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Expired` for expired tokens and
    /// `TokenError::Malformed` for anything else that fails validation.
    pub fn verify(&self, token: &str) -> Result<CurrentUser, TokenError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)?;
        let id = data
            .claims
            .sub
            .parse::<i32>()
            .map_err(|_| TokenError::Malformed("subject is not a user id".to_owned()))?;

        Ok(CurrentUser {
            id: UserId::new(id),
            role: data.claims.role,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SECRET: &str = "k9#Lm2$pQ7!vX4@wR8&nT1*zB5^cF3%h";

    fn service(secret: &str) -> TokenService {
        TokenService::new(
            &SecretString::from(secret.to_owned()),
            Duration::from_secs(3600),
        )
    }

    #[test]
    fn test_issue_and_verify() {
        let tokens = service(SECRET);
        let token = tokens.issue(UserId::new(42), Role::Admin).unwrap();

        let user = tokens.verify(&token).unwrap();
        assert_eq!(user.id, UserId::new(42));
        assert_eq!(user.role, Role::Admin);
    }

    #[test]
    fn test_verify_rejects_other_key() {
        let token = service(SECRET).issue(UserId::new(1), Role::User).unwrap();

        let err = service("another-secret-with-enough-length!!")
            .verify(&token)
            .unwrap_err();
        assert!(matches!(err, TokenError::Malformed(_)));
    }

    #[test]
    fn test_verify_rejects_expired() {
        let tokens = service(SECRET);
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "1".to_owned(),
            role: Role::User,
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(matches!(tokens.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let tokens = service(SECRET);
        assert!(tokens.verify("not-a-token").is_err());
    }
}
