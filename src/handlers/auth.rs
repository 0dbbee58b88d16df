//! Signup and login flows: the only places a token is issued.

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash};
use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::auth::sign_token;
use crate::context::ApiContext;
use crate::error::ApiError;
use crate::extract::Json;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::models::{NewUser, Role, User, UserRecord};

const INCORRECT_CREDENTIALS: &str = "Incorrect email or password";

#[derive(Serialize)]
pub struct UserData {
    pub user: User,
}

pub async fn signup(
    State(ctx): State<ApiContext>,
    Json(payload): Json<NewUser>,
) -> ApiResult<UserData> {
    let signup = payload.validate()?;
    let password_hash = hash_password(signup.password).await?;

    let user = ctx
        .users
        .create(UserRecord {
            name: signup.name,
            email: signup.email,
            password_hash,
            role: Role::User,
        })
        .await?;

    let token = sign_token(&ctx.config.jwt, user.id)?;
    Ok(ApiResponse::with_token(token, UserData { user }))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

pub async fn login(
    State(ctx): State<ApiContext>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<()> {
    let (email, password) = match (payload.email, payload.password) {
        (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
            (email, password)
        }
        _ => return Err(ApiError::bad_request("Please provide email and password!")),
    };

    // Unknown email and wrong password are deliberately indistinguishable.
    let (user, password_hash) = ctx
        .users
        .credentials_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::unauthorized(INCORRECT_CREDENTIALS))?;

    verify_password(password, password_hash).await?;

    let token = sign_token(&ctx.config.jwt, user.id)?;
    Ok(ApiResponse::token_only(token))
}

/// Argon2 hashing is computationally intensive on purpose, so it runs on a
/// blocking thread.
pub async fn hash_password(password: String) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || -> Result<String, ApiError> {
        let salt = SaltString::generate(rand::thread_rng());
        Ok(PasswordHash::generate(Argon2::default(), password, &salt)
            .map_err(|e| anyhow::anyhow!("failed to generate password hash: {}", e))?
            .to_string())
    })
    .await
    .map_err(|e| ApiError::internal(anyhow::anyhow!("panic in password hashing: {}", e)))?
}

async fn verify_password(password: String, password_hash: String) -> Result<(), ApiError> {
    tokio::task::spawn_blocking(move || -> Result<(), ApiError> {
        let hash = PasswordHash::new(&password_hash)
            .map_err(|e| anyhow::anyhow!("invalid password hash: {}", e))?;

        hash.verify_password(&[&Argon2::default()], password)
            .map_err(|e| match e {
                argon2::password_hash::Error::Password => {
                    ApiError::unauthorized(INCORRECT_CREDENTIALS)
                }
                _ => anyhow::anyhow!("failed to verify password hash: {}", e).into(),
            })
    })
    .await
    .map_err(|e| ApiError::internal(anyhow::anyhow!("panic in password verification: {}", e)))?
}
