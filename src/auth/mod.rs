//! Token service: issues and verifies the signed, time-limited identity
//! tokens presented on protected routes.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::error::ApiError;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id the token asserts.
    pub sub: Uuid,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, expiry_hours: u64) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            iat: now.timestamp(),
            exp: (now + Duration::hours(expiry_hours as i64)).timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("You are not logged in! Please log in to get access.")]
    MissingToken,
    #[error("Invalid token. Please log in again!")]
    InvalidToken,
    #[error("Your token has expired! Please log in again.")]
    TokenExpired,
    #[error("The user belonging to this token does no longer exist.")]
    UserGone,
    #[error("JWT secret is not configured")]
    MissingSecret,
    #[error("token signing failed: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            // Misconfiguration is a programming/deployment defect, not a
            // client problem.
            AuthError::MissingSecret | AuthError::Signing(_) => {
                ApiError::internal(anyhow::Error::new(err))
            }
            _ => ApiError::unauthorized(err.to_string()),
        }
    }
}

/// Sign a token for the given user id. No retries: a signing failure
/// surfaces to the caller as a 500-class error.
pub fn sign_token(config: &JwtConfig, user_id: Uuid) -> Result<String, AuthError> {
    if config.secret.is_empty() {
        return Err(AuthError::MissingSecret);
    }
    let claims = Claims::new(user_id, config.expiry_hours);
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(AuthError::Signing)
}

/// Verify signature and expiry, returning the decoded claims.
pub fn verify_token(config: &JwtConfig, token: &str) -> Result<Claims, AuthError> {
    if config.secret.is_empty() {
        return Err(AuthError::MissingSecret);
    }
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })
}
