use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use trailhead::config::AppConfig;
use trailhead::context::{ApiContext, Stores};
use trailhead::{error, routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trailhead=debug,tower_http=debug".into()),
        )
        .init();

    let config = AppConfig::from_env();
    error::init_error_rendering(config.environment);
    tracing::info!("starting in {:?} mode", config.environment);

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to database")?;

    sqlx::migrate!()
        .run(&pool)
        .await
        .context("failed to run migrations")?;

    let port = config.port;
    let ctx = ApiContext::new(Arc::new(config), Stores::postgres(pool));
    let app = routes::app(ctx);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("failed to bind port {}", port))?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")
}
