//! Access-token handling.
//!
//! The server does not register or log users in; the identity service does that and issues
//! HS256 JWTs with the shared `MPS_JWT_SECRET`. This module signs tokens (for tooling and
//! tests) and verifies them on every authenticated request. Verified claims are stashed in the
//! request extensions by [`crate::middleware::JwtMiddlewareFactory`], from where the
//! [`JwtClaims`] extractor picks them up.
use std::future::{ready, Ready};

use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use marketplace_engine::db_types::Role;
use serde::{Deserialize, Serialize};

use crate::{config::AuthConfig, errors::AuthError, errors::ServerError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// The user id, as assigned by the identity service.
    pub sub: String,
    pub role: Role,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

impl JwtClaims {
    pub fn new(sub: String, role: Role, expires: chrono::DateTime<Utc>) -> Self {
        Self { sub, role, exp: expires.timestamp() }
    }
}

impl FromRequest for JwtClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let claims = req
            .extensions()
            .get::<JwtClaims>()
            .cloned()
            .ok_or(ServerError::AuthenticationError(AuthError::MissingToken));
        ready(claims)
    }
}

#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.reveal().as_bytes();
        Self { encoding_key: EncodingKey::from_secret(secret), decoding_key: DecodingKey::from_secret(secret) }
    }

    /// Issues a signed access token for the given user. Default validity is 24 hours.
    pub fn issue_token(&self, sub: &str, role: Role, validity: Option<Duration>) -> Result<String, AuthError> {
        let validity = validity.unwrap_or_else(|| Duration::hours(24));
        let claims = JwtClaims::new(sub.to_string(), role, Utc::now() + validity);
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::ValidationError(e.to_string()))
    }

    /// Verifies the signature and expiry of a bearer token and returns its claims.
    pub fn decode_token(&self, token: &str) -> Result<JwtClaims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<JwtClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::InvalidToken => AuthError::PoorlyFormattedToken(e.to_string()),
                _ => AuthError::ValidationError(e.to_string()),
            })
    }
}

/// Pulls the bearer token out of the `Authorization` header.
pub fn extract_bearer_token(req: &HttpRequest) -> Result<&str, AuthError> {
    let header = req.headers().get("Authorization").ok_or(AuthError::MissingToken)?;
    let value = header.to_str().map_err(|e| AuthError::PoorlyFormattedToken(e.to_string()))?;
    value.strip_prefix("Bearer ").ok_or_else(|| {
        AuthError::PoorlyFormattedToken("Authorization header must be of the form 'Bearer <token>'".to_string())
    })
}

#[cfg(test)]
mod test {
    use super::*;

    fn issuer() -> TokenIssuer {
        let config = AuthConfig { jwt_secret: mps_common::Secret::new("test-secret-test-secret-test-secret!".into()) };
        TokenIssuer::new(&config)
    }

    #[test]
    fn tokens_round_trip() {
        let issuer = issuer();
        let token = issuer.issue_token("user-1", Role::Seller, None).expect("issue failed");
        let claims = issuer.decode_token(&token).expect("decode failed");
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.role, Role::Seller);
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let issuer = issuer();
        let token = issuer.issue_token("user-1", Role::Buyer, Some(Duration::hours(-2))).expect("issue failed");
        assert!(issuer.decode_token(&token).is_err());
    }

    #[test]
    fn doctored_tokens_are_rejected() {
        let issuer = issuer();
        let mut token = issuer.issue_token("user-1", Role::Buyer, None).expect("issue failed");
        token.replace_range(token.len() - 6.., "AAAAAA");
        assert!(issuer.decode_token(&token).is_err());
    }
}
