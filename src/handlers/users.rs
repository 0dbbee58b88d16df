use axum::extract::{Path, State};
use axum::http::Uri;
use serde::Serialize;

use crate::context::ApiContext;
use crate::extract::Json;
use crate::handlers::parse_id;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::models::{UpdateUser, User};

#[derive(Serialize)]
pub struct UserData {
    pub user: User,
}

#[derive(Serialize)]
pub struct UsersData {
    pub users: Vec<User>,
}

pub async fn list_users(State(ctx): State<ApiContext>) -> ApiResult<UsersData> {
    let users = ctx.users.list().await?;
    Ok(ApiResponse::listing(users.len(), UsersData { users }))
}

pub async fn get_user(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    uri: Uri,
) -> ApiResult<UserData> {
    let id = parse_id(&id, &uri)?;
    let user = ctx.users.get(id).await?;
    Ok(ApiResponse::success(UserData { user }))
}

pub async fn update_user(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    uri: Uri,
    Json(payload): Json<UpdateUser>,
) -> ApiResult<UserData> {
    let id = parse_id(&id, &uri)?;
    let changes = payload.validate()?;
    let user = ctx.users.update(id, changes).await?;
    Ok(ApiResponse::success(UserData { user }))
}

pub async fn delete_user(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    uri: Uri,
) -> ApiResult<()> {
    let id = parse_id(&id, &uri)?;
    ctx.users.delete(id).await?;
    Ok(ApiResponse::no_content())
}
