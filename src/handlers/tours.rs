use axum::extract::{Path, State};
use axum::http::Uri;
use serde::Serialize;

use crate::context::ApiContext;
use crate::extract::{Json, Query};
use crate::handlers::parse_id;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::models::{DifficultyStats, NewTour, TourFilter, TourView, UpdateTour};

#[derive(Serialize)]
pub struct TourData {
    pub tour: TourView,
}

#[derive(Serialize)]
pub struct ToursData {
    pub tours: Vec<TourView>,
}

#[derive(Serialize)]
pub struct StatsData {
    pub stats: Vec<DifficultyStats>,
}

pub async fn list_tours(
    State(ctx): State<ApiContext>,
    Query(filter): Query<TourFilter>,
) -> ApiResult<ToursData> {
    let tours = ctx.tours.list(&filter).await?;
    Ok(ApiResponse::listing(tours.len(), ToursData { tours }))
}

pub async fn create_tour(
    State(ctx): State<ApiContext>,
    Json(payload): Json<NewTour>,
) -> ApiResult<TourData> {
    let tour = ctx.tours.create(payload).await?;
    Ok(ApiResponse::created(TourData { tour }))
}

pub async fn get_tour(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    uri: Uri,
) -> ApiResult<TourData> {
    let id = parse_id(&id, &uri)?;
    let tour = ctx.tours.get(id).await?;
    Ok(ApiResponse::success(TourData { tour }))
}

pub async fn update_tour(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    uri: Uri,
    Json(payload): Json<UpdateTour>,
) -> ApiResult<TourData> {
    let id = parse_id(&id, &uri)?;
    let tour = ctx.tours.update(id, payload).await?;
    Ok(ApiResponse::success(TourData { tour }))
}

pub async fn delete_tour(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    uri: Uri,
) -> ApiResult<()> {
    let id = parse_id(&id, &uri)?;
    ctx.tours.delete(id).await?;
    Ok(ApiResponse::no_content())
}

pub async fn tour_stats(State(ctx): State<ApiContext>) -> ApiResult<StatsData> {
    let stats = ctx.tours.stats().await?;
    Ok(ApiResponse::success(StatsData { stats }))
}
