//! Route tables: URL patterns bound to handlers, with the auth middleware
//! inserted on the protected sub-routers.

use axum::extract::Request;
use axum::http::Uri;
use axum::middleware::{self, Next};
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::context::ApiContext;
use crate::error::ApiError;
use crate::handlers::{auth, reviews, tours, users};
use crate::middleware::auth::{protect, restrict_to};
use crate::models::Role;

const ADMIN_ONLY: &[Role] = &[Role::Admin];
const REVIEWERS: &[Role] = &[Role::User];

pub fn app(ctx: ApiContext) -> Router {
    Router::new()
        .merge(user_routes(ctx.clone()))
        .merge(tour_routes())
        .merge(review_routes(ctx.clone()))
        .fallback(not_found)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

fn user_routes(ctx: ApiContext) -> Router<ApiContext> {
    let admin = Router::new()
        .route("/api/v1/users", get(users::list_users))
        .route(
            "/api/v1/users/:id",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
        .route_layer(middleware::from_fn(|req: Request, next: Next| {
            restrict_to(ADMIN_ONLY, req, next)
        }))
        .route_layer(middleware::from_fn_with_state(ctx, protect));

    Router::new()
        .route("/api/v1/users/signup", post(auth::signup))
        .route("/api/v1/users/login", post(auth::login))
        .merge(admin)
}

fn tour_routes() -> Router<ApiContext> {
    Router::new()
        .route(
            "/api/v1/tours",
            get(tours::list_tours).post(tours::create_tour),
        )
        .route("/api/v1/tours/stats", get(tours::tour_stats))
        .route(
            "/api/v1/tours/:id",
            get(tours::get_tour)
                .patch(tours::update_tour)
                .delete(tours::delete_tour),
        )
}

fn review_routes(ctx: ApiContext) -> Router<ApiContext> {
    // POST requires an authenticated caller with the "user" role; protect is
    // added last so it runs before the role gate.
    let create = Router::new()
        .route("/api/v1/tours/:id/reviews", post(reviews::create_review))
        .route_layer(middleware::from_fn(|req: Request, next: Next| {
            restrict_to(REVIEWERS, req, next)
        }))
        .route_layer(middleware::from_fn_with_state(ctx, protect));

    Router::new()
        .route("/api/v1/tours/:id/reviews", get(reviews::reviews_for_tour))
        .route("/api/v1/reviews", get(reviews::list_reviews))
        .route("/api/v1/reviews/:id", delete(reviews::delete_review))
        .merge(create)
}

/// Catch-all for unmatched method+path pairs, funneled through the same
/// error renderer as everything else.
async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("Can't find {} on this server!", uri.path()))
}
