//! Habit streak API server

use axum::{
    routing::{get, patch, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

mod error;
mod routes;
mod state;

use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("processor=debug".parse()?)
                .add_directive("api=debug".parse()?),
        )
        .init();

    info!("🔥 Starting habit streak API");

    // Load configuration
    let config = common::Config::from_env();
    info!(
        "Weeks start on {}, {} profile write retries",
        config.engine.week_starts_on, config.engine.max_commit_retries
    );

    // Connect to database
    let pool = db::create_pool(&config.database_url).await?;

    // Run migrations
    db::run_migrations(&pool).await?;

    // Create app state
    let (state, mut unlocks) = AppState::new(config.clone(), pool);
    let state = Arc::new(state);

    // Unlocks are also kept as pending notifications in the database
    tokio::spawn(async move {
        while let Some(badge) = unlocks.recv().await {
            info!(
                "🏆 Badge {} ({}) unlocked at {}",
                badge.name, badge.badge_id, badge.unlocked_at
            );
        }
    });

    let app = Router::new()
        .route("/health", get(routes::health::health))
        .route(
            "/api/habits",
            get(routes::habits::list).post(routes::habits::create),
        )
        .route(
            "/api/habits/:id",
            patch(routes::habits::update).delete(routes::habits::delete),
        )
        .route("/api/habits/:id/archive", post(routes::habits::archive))
        .route("/api/habits/:id/complete", post(routes::habits::complete))
        .route("/api/habits/:id/undo", post(routes::habits::undo))
        .route(
            "/api/habits/:id/completions",
            get(routes::completions::history),
        )
        .route(
            "/api/habits/:id/completions/:date/note",
            put(routes::completions::note),
        )
        .route("/api/completions/counts", get(routes::completions::counts))
        .route("/api/habits/:id/rest-days", get(routes::habits::rest_days))
        .route(
            "/api/habits/:id/rest-days/:date",
            put(routes::habits::skip).delete(routes::habits::unskip),
        )
        .route("/api/habits/:id/streak", get(routes::habits::streak))
        .route("/api/profile", get(routes::profile::get))
        .route("/api/badges", get(routes::badges::list))
        .route("/api/notifications", get(routes::notifications::pending))
        .route(
            "/api/notifications/:badge_id/ack",
            post(routes::notifications::ack),
        )
        .route("/api/recalculate", post(routes::recalc::trigger))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    info!("🚀 Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
