//! Devotee sessions.
//!
//! Session tokens are HS256 JWTs issued by the platform's login service. This server only verifies them. A token is
//! read from the `Authorization: Bearer <token>` header, or failing that, from a `daan_access_token` header or cookie.
use std::future::{ready, Ready};

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use jwt_compact::{
    alg::{Hs256, Hs256Key},
    AlgorithmExt,
    TimeOptions,
    Token,
    UntrustedToken,
    ValidationError,
};
use log::*;
use serde::{Deserialize, Serialize};

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

pub const ACCESS_TOKEN_NAME: &str = "daan_access_token";

/// The custom claims carried in a devotee session token. The expiry is the standard `exp` claim and is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    pub devotee_id: i64,
}

#[derive(Clone)]
pub struct TokenVerifier {
    key: Hs256Key,
}

impl TokenVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        Self { key: Hs256Key::new(config.jwt_secret.reveal().as_bytes()) }
    }

    pub fn verify(&self, token: &str) -> Result<JwtClaims, AuthError> {
        let untrusted = UntrustedToken::new(token).map_err(|e| AuthError::PoorlyFormattedToken(e.to_string()))?;
        let token: Token<JwtClaims> =
            Hs256.validator(&self.key).validate(&untrusted).map_err(|e| AuthError::ValidationError(e.to_string()))?;
        token.claims().validate_expiration(&TimeOptions::default()).map_err(|e| match e {
            ValidationError::Expired => AuthError::Expired,
            e => AuthError::ValidationError(e.to_string()),
        })?;
        Ok(token.claims().custom.clone())
    }
}

fn access_token(req: &HttpRequest) -> Option<String> {
    let bearer = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|s| s.trim().to_string());
    bearer
        .or_else(|| req.headers().get(ACCESS_TOKEN_NAME).and_then(|v| v.to_str().ok()).map(String::from))
        .or_else(|| req.cookie(ACCESS_TOKEN_NAME).map(|c| c.value().to_string()))
        .filter(|s| !s.is_empty())
}

fn extract_claims(req: &HttpRequest) -> Result<JwtClaims, ServerError> {
    let verifier = req.app_data::<web::Data<TokenVerifier>>().ok_or_else(|| {
        error!("💻️ No token verifier has been registered with the app. Every authenticated request will fail.");
        ServerError::ConfigurationError("No token verifier has been configured".into())
    })?;
    let token = access_token(req).ok_or(AuthError::MissingToken)?;
    let claims = verifier.verify(&token).map_err(|e| {
        debug!("💻️ Rejected access token. {e}");
        e
    })?;
    trace!("💻️ Request authenticated for devotee {}", claims.devotee_id);
    Ok(claims)
}

impl FromRequest for JwtClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract_claims(req))
    }
}
