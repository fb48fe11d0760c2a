//! HS256 JWT signing and verification.
//!
//! Signature verification and claims validation are split: `jsonwebtoken`
//! checks the signature, [`crate::validate_claims`] checks the time window
//! against a caller-supplied clock so the whole path stays deterministic in
//! tests.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::claims::{JwtClaims, TokenValidationError, validate_claims};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Token is malformed, uses the wrong algorithm, or fails signature
    /// verification. Collapsed deliberately: callers must not be able to
    /// distinguish "bad signature" from "garbage input".
    #[error("invalid token")]
    Invalid,

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// Issues signed tokens.
pub trait JwtSigner: Send + Sync {
    fn sign(&self, claims: &JwtClaims) -> Result<String, TokenError>;
}

/// Verifies token signatures and claims.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenError>;
}

/// Symmetric HS256 key implementing both sides.
pub struct Hs256JwtKey {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Hs256JwtKey {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

impl JwtSigner for Hs256JwtKey {
    fn sign(&self, claims: &JwtClaims) -> Result<String, TokenError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|_| TokenError::Invalid)
    }
}

impl JwtValidator for Hs256JwtKey {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenError> {
        // Time-window checks are done by validate_claims against `now`.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.decoding, &validation)
            .map_err(|_| TokenError::Invalid)?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use merx_core::UserId;

    fn claims_for(window: Duration) -> JwtClaims {
        let now = Utc::now();
        JwtClaims {
            sub: UserId::new(),
            issued_at: now,
            expires_at: now + window,
        }
    }

    #[test]
    fn sign_then_validate_round_trips() {
        let key = Hs256JwtKey::new(b"test-secret");
        let claims = claims_for(Duration::minutes(10));

        let token = key.sign(&claims).unwrap();
        let got = key.validate(&token, Utc::now()).unwrap();
        assert_eq!(got.sub, claims.sub);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let signer = Hs256JwtKey::new(b"secret-a");
        let verifier = Hs256JwtKey::new(b"secret-b");
        let token = signer.sign(&claims_for(Duration::minutes(10))).unwrap();

        assert_eq!(
            verifier.validate(&token, Utc::now()),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn expired_token_is_rejected_with_claims_error() {
        let key = Hs256JwtKey::new(b"test-secret");
        let token = key.sign(&claims_for(Duration::minutes(10))).unwrap();

        let later = Utc::now() + Duration::hours(1);
        assert_eq!(
            key.validate(&token, later),
            Err(TokenError::Claims(TokenValidationError::Expired))
        );
    }

    #[test]
    fn garbage_is_rejected() {
        let key = Hs256JwtKey::new(b"test-secret");
        assert_eq!(
            key.validate("not.a.token", Utc::now()),
            Err(TokenError::Invalid)
        );
    }
}
