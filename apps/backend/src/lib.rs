pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::db::Database;
use crate::services::catalog::CatalogClient;
use crate::services::events::EventPublisher;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub catalog: Arc<CatalogClient>,
    pub publisher: Arc<EventPublisher>,
}

/// Build the full router over the given state.
pub fn app(state: AppState) -> Router {
    let protected_routes = Router::new()
        // Practice routes
        .route(
            "/practices",
            get(routes::practices::list).post(routes::practices::start),
        )
        .route("/practices/ongoing", get(routes::practices::ongoing))
        .route(
            "/practices/{practice_id}",
            get(routes::practices::get_practice).delete(routes::practices::delete_practice),
        )
        .route(
            "/practices/{practice_id}/flashcards",
            get(routes::practices::flashcards),
        )
        .route(
            "/practices/{practice_id}/flashcards/{flashcard_id}/answer",
            post(routes::answers::submit),
        )
        // Topic routes
        .route("/topics/{topic_id}/practices", get(routes::practices::by_topic))
        .route(
            "/topics/{topic_id}/practices/latestFinished",
            get(routes::practices::latest_finished),
        )
        .layer(middleware::from_fn(routes::auth::auth_middleware));

    Router::new()
        .route("/health", get(health_check))
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Connect to database
    let database_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set");

    tracing::info!("Connecting to database...");
    let db = Database::connect(&database_url).await?;

    tracing::info!("Running migrations...");
    db.run_migrations().await?;

    let catalog = CatalogClient::from_env()?;
    let publisher = EventPublisher::from_env()?;

    let state = AppState {
        db: Arc::new(db),
        catalog: Arc::new(catalog),
        publisher: Arc::new(publisher),
    };

    let app = app(state);

    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
