use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::{self, AuthError};
use crate::context::ApiContext;
use crate::error::ApiError;
use crate::models::{Role, User};

/// Authenticated identity attached to the request after `protect` runs.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

/// Validates the bearer token on protected routes: verify signature and
/// expiry, resolve the subject to a live user, attach the identity for
/// downstream handlers. Any failure is an operational 401.
pub async fn protect(
    State(ctx): State<ApiContext>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers()).ok_or(AuthError::MissingToken)?;
    let claims = auth::verify_token(&ctx.config.jwt, &token)?;

    // The token may outlive its account.
    let user = ctx
        .users
        .find_by_id(claims.sub)
        .await?
        .ok_or(AuthError::UserGone)?;

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

/// Role gate registered per route with a fixed permitted set. Runs after
/// `protect`, which put the identity in the request extensions.
pub async fn restrict_to(
    allowed: &'static [Role],
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let current = request
        .extensions()
        .get::<CurrentUser>()
        .ok_or(AuthError::MissingToken)?;

    if !allowed.contains(&current.0.role) {
        return Err(ApiError::forbidden(
            "You do not have permission to perform this action",
        ));
    }
    Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get("authorization")?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
