use axum::extract::{Path, State};
use axum::http::Uri;
use axum::Extension;
use serde::Serialize;

use crate::context::ApiContext;
use crate::extract::Json;
use crate::handlers::parse_id;
use crate::middleware::auth::CurrentUser;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::models::{NewReview, Review};

#[derive(Serialize)]
pub struct ReviewData {
    pub review: Review,
}

#[derive(Serialize)]
pub struct ReviewsData {
    pub reviews: Vec<Review>,
}

pub async fn list_reviews(State(ctx): State<ApiContext>) -> ApiResult<ReviewsData> {
    let reviews = ctx.reviews.list().await?;
    Ok(ApiResponse::listing(reviews.len(), ReviewsData { reviews }))
}

pub async fn reviews_for_tour(
    State(ctx): State<ApiContext>,
    Path(tour_id): Path<String>,
    uri: Uri,
) -> ApiResult<ReviewsData> {
    let tour_id = parse_id(&tour_id, &uri)?;
    let reviews = ctx.reviews.list_for_tour(tour_id).await?;
    Ok(ApiResponse::listing(reviews.len(), ReviewsData { reviews }))
}

pub async fn create_review(
    State(ctx): State<ApiContext>,
    Path(tour_id): Path<String>,
    uri: Uri,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<NewReview>,
) -> ApiResult<ReviewData> {
    let tour_id = parse_id(&tour_id, &uri)?;
    let review = ctx.reviews.create(tour_id, current.0.id, payload).await?;
    Ok(ApiResponse::created(ReviewData { review }))
}

pub async fn delete_review(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    uri: Uri,
) -> ApiResult<()> {
    let id = parse_id(&id, &uri)?;
    ctx.reviews.delete(id).await?;
    Ok(ApiResponse::no_content())
}
