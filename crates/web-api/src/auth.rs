//! Session tokens and the authenticated-user extractor.
//!
//! Login issues a signed JWT carrying the user id; authenticated routes
//! present it as a bearer token. Session persistence beyond the token
//! lifetime is the client's concern.

use crate::error::ApiError;
use crate::state::AppState;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use blockbridge_core::{AuthConfig, UserProfile};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// JWT claims: subject (user id) and expiry.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

/// Issues and verifies session tokens.
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenSigner {
    /// Creates a signer from auth configuration.
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl: Duration::hours(config.token_ttl_hours),
        }
    }

    /// Issues a token for the given user id.
    ///
    /// # Errors
    /// Returns an error if signing fails.
    pub fn issue(&self, user_id: &str) -> Result<String, ApiError> {
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (Utc::now() + self.ttl).timestamp() as usize,
        };
        encode(&Header::default(), &claims, &self.encoding).map_err(|e| {
            ApiError::new(
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                format!("token signing failed: {e}"),
            )
        })
    }

    /// Verifies a token and returns the subject user id.
    ///
    /// # Errors
    /// Returns 401 for an invalid or expired token.
    pub fn verify(&self, token: &str) -> Result<String, ApiError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims.sub)
            .map_err(|_| ApiError::unauthorized())
    }
}

/// The authenticated caller, resolved from the bearer token to a fresh
/// sanitized profile.
pub struct AuthUser(pub UserProfile);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(ApiError::unauthorized)?;

        let user_id = state.tokens.verify(token)?;

        let user = state
            .users
            .find_by_id(&user_id)
            .await
            .map_err(ApiError::from)?
            .ok_or_else(ApiError::unauthorized)?;

        Ok(Self(user.profile()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer(ttl_hours: i64) -> TokenSigner {
        TokenSigner::new(&AuthConfig {
            jwt_secret: "test-secret".to_string().into(),
            token_ttl_hours: ttl_hours,
        })
    }

    #[test]
    fn test_issue_verify_roundtrip() {
        let signer = signer(24);
        let token = signer.issue("user-1").unwrap();
        assert_eq!(signer.verify(&token).unwrap(), "user-1");
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let signer = signer(24);
        assert!(signer.verify("not.a.token").is_err());
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let token = signer(24).issue("user-1").unwrap();

        let other = TokenSigner::new(&AuthConfig {
            jwt_secret: "different-secret".to_string().into(),
            token_ttl_hours: 24,
        });
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn test_verify_rejects_expired_token() {
        let signer = signer(-1);
        let token = signer.issue("user-1").unwrap();
        assert!(signer.verify(&token).is_err());
    }
}
