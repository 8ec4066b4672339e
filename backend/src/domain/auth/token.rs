//! Demo JWT issuance and expiration decoding.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::User;
use std::sync::Arc;
use uuid::Uuid;

/// Nominal validity of a demo token
pub const DEMO_TOKEN_VALIDITY_HOURS: i64 = 24;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Failed to encode token: {0}")]
    Encode(#[source] jsonwebtoken::errors::Error),
    #[error("Failed to decode token: {0}")]
    Decode(#[source] jsonwebtoken::errors::Error),
    #[error("Token expiration {0} is out of range")]
    InvalidExpiration(i64),
}

/// Claims carried by demo access tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoClaims {
    pub sub: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// Issues HS256 demo tokens and reads their expiration back
#[derive(Clone)]
pub struct TokenService {
    encoding_key: Arc<EncodingKey>,
    decoding_key: Arc<DecodingKey>,
    validity: Duration,
}

impl TokenService {
    /// Token service with the nominal 24 hour validity
    pub fn new(secret: &str) -> Self {
        Self::with_validity(secret, Duration::hours(DEMO_TOKEN_VALIDITY_HOURS))
    }

    pub fn with_validity(secret: &str, validity: Duration) -> Self {
        Self {
            encoding_key: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding_key: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
            validity,
        }
    }

    pub fn validity(&self) -> Duration {
        self.validity
    }

    /// Issue a token for `user` valid from `now`
    pub fn issue(&self, user: &User, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = DemoClaims {
            sub: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            iat: now.timestamp(),
            exp: (now + self.validity).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(TokenError::Encode)
    }

    /// Decode a token's claims. The signature is checked, the expiration is not:
    /// deciding what an expired token means is up to the caller.
    pub fn decode_claims(&self, token: &str) -> Result<DemoClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        decode::<DemoClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(TokenError::Decode)
    }

    /// Expiration instant of a token
    pub fn expiration(&self, token: &str) -> Result<DateTime<Utc>, TokenError> {
        let claims = self.decode_claims(token)?;
        DateTime::from_timestamp(claims.exp, 0).ok_or(TokenError::InvalidExpiration(claims.exp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: "u-1".to_string(),
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            role: "auditor".to_string(),
        }
    }

    #[test]
    fn test_issued_token_expires_after_validity() {
        let service = TokenService::new("secret");
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();

        let token = service.issue(&user(), now).unwrap();
        assert_eq!(service.expiration(&token).unwrap(), now + Duration::hours(24));

        let claims = service.decode_claims(&token).unwrap();
        assert_eq!(claims.sub, "u-1");
        assert_eq!(claims.name, "Ana");
        assert_eq!(claims.iat, now.timestamp());
    }

    #[test]
    fn test_expired_token_still_decodes() {
        let service = TokenService::new("secret");
        let long_ago = DateTime::from_timestamp(1_000_000_000, 0).unwrap();

        let token = service.issue(&user(), long_ago).unwrap();
        assert_eq!(service.expiration(&token).unwrap(), long_ago + Duration::hours(24));
    }

    #[test]
    fn test_tokens_are_unique() {
        let service = TokenService::new("secret");
        let now = Utc::now();
        assert_ne!(service.issue(&user(), now).unwrap(), service.issue(&user(), now).unwrap());
    }

    #[test]
    fn test_decode_rejects_garbage_and_foreign_signatures() {
        let service = TokenService::new("secret");
        assert!(matches!(service.expiration("not-a-jwt"), Err(TokenError::Decode(_))));

        let other = TokenService::new("other-secret");
        let token = other.issue(&user(), Utc::now()).unwrap();
        assert!(matches!(service.expiration(&token), Err(TokenError::Decode(_))));
    }
}
