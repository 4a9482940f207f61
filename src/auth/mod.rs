//! Bearer token issuing and validation.
//!
//! Stateless HS256 JWTs carrying the user identity and an expiration.
//! There is no server-side session store; a token is valid until it
//! expires or the signing secret changes.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::User;
use crate::error::{AppError, AppResult};

/// JWT claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id
    pub sub: Uuid,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issued token returned to the client
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedToken {
    pub access_token: String,
    pub token_type: String,
    /// Lifetime in seconds
    pub expires_in: i64,
}

/// Issues and validates bearer tokens.
#[derive(Clone)]
pub struct TokenService {
    secret: String,
    expiration_hours: i64,
}

impl TokenService {
    pub fn new(secret: String, expiration_hours: i64) -> Self {
        Self {
            secret,
            expiration_hours,
        }
    }

    /// Issue a signed token for a user.
    pub fn issue(&self, user: &User) -> AppResult<IssuedToken> {
        let now = Utc::now();
        let expires_at = now + Duration::hours(self.expiration_hours);

        let claims = Claims {
            sub: user.id,
            username: user.username.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token signing failed: {}", e)))?;

        Ok(IssuedToken {
            access_token: token,
            token_type: "Bearer".to_string(),
            expires_in: self.expiration_hours * 3600,
        })
    }

    /// Validate a token and extract its claims.
    ///
    /// Fails with `Unauthenticated` on malformed input, a bad signature, or
    /// an expired token.
    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AppError::Unauthenticated)?;

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "hash".to_string(),
            full_name: "Alice Smith".to_string(),
            phone_number: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let tokens = TokenService::new("test-secret".to_string(), 24);
        let user = sample_user();

        let issued = tokens.issue(&user).unwrap();
        assert_eq!(issued.token_type, "Bearer");
        assert_eq!(issued.expires_in, 24 * 3600);

        let claims = tokens.verify(&issued.access_token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.username, "alice");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = TokenService::new("secret-a".to_string(), 24);
        let verifier = TokenService::new("secret-b".to_string(), 24);

        let issued = issuer.issue(&sample_user()).unwrap();
        let result = verifier.verify(&issued.access_token);
        assert!(matches!(result, Err(AppError::Unauthenticated)));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let tokens = TokenService::new("test-secret".to_string(), 24);
        assert!(matches!(
            tokens.verify("not.a.token"),
            Err(AppError::Unauthenticated)
        ));
        assert!(matches!(tokens.verify(""), Err(AppError::Unauthenticated)));
    }

    #[test]
    fn test_expired_token_rejected() {
        // Negative lifetime puts exp in the past
        let tokens = TokenService::new("test-secret".to_string(), -1);
        let issued = tokens.issue(&sample_user()).unwrap();

        let result = tokens.verify(&issued.access_token);
        assert!(matches!(result, Err(AppError::Unauthenticated)));
    }
}
