//! Common test utilities and fixtures for integration tests.
//!
//! This module provides shared test infrastructure including:
//! - TestContext for setting up the test environment with a database
//! - A stub upstream serving the flashcard catalog and the event bus
//! - Authentication helpers
//!
//! # Requirements
//! Integration tests require a PostgreSQL database (set DATABASE_URL).

pub mod fixtures;

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::Query;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use uuid::Uuid;

use practice_backend::db::Database;
use practice_backend::services::catalog::CatalogClient;
use practice_backend::services::events::EventPublisher;
use practice_backend::AppState;

/// Test context containing database connection and test server.
///
/// The catalog and the event bus are replaced by a local stub server; the
/// number of flashcards the stub catalog serves for a topic is encoded in
/// the topic id (see [`fixtures::unique_topic`]).
pub struct TestContext {
    pub db: Arc<Database>,
    app: Router,
}

impl TestContext {
    /// Create a new test context.
    ///
    /// # Panics
    /// Panics if DATABASE_URL is not set or database connection fails.
    pub async fn new() -> Self {
        dotenvy::dotenv().ok();

        let database_url =
            std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests");

        let db = Database::connect(&database_url)
            .await
            .expect("Failed to connect to test database");

        db.run_migrations()
            .await
            .expect("Failed to run migrations");

        let db = Arc::new(db);

        let upstream = spawn_upstream_stub().await;

        let catalog = CatalogClient::new(&upstream).expect("Failed to create catalog client");
        let publisher =
            EventPublisher::new(&upstream, "practices-test").expect("Failed to create publisher");

        let state = AppState {
            db: db.clone(),
            catalog: Arc::new(catalog),
            publisher: Arc::new(publisher),
        };

        let app = practice_backend::app(state);

        Self { db, app }
    }

    /// Get the router for use with axum-test.
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    /// Authorization header value for the given caller.
    pub fn auth_header_value(email: &str) -> HeaderValue {
        HeaderValue::from_str(&format!("Bearer {}", fixtures::jwt(email)))
            .expect("valid header value")
    }

    /// Clean up all practices (and their flashcards) of a topic.
    pub async fn cleanup_topic(&self, topic_id: &str) {
        let _ = sqlx::query(
            "DELETE FROM practice_flashcards WHERE practice_id IN \
             (SELECT id FROM practices WHERE topic_id = $1)",
        )
        .bind(topic_id)
        .execute(self.db.pool())
        .await;

        let _ = sqlx::query("DELETE FROM practices WHERE topic_id = $1")
            .bind(topic_id)
            .execute(self.db.pool())
            .await;
    }
}

/// Spawn the stub upstream server and return its base URL.
///
/// Serves `GET /flashcards` (the catalog) and `POST /events` (the event
/// bus). The catalog returns as many flashcards as the numeric suffix of
/// the requested topic id, defaulting to 2.
async fn spawn_upstream_stub() -> String {
    let router = Router::new()
        .route("/flashcards", get(stub_flashcards))
        .route("/events", post(|| async { Json(json!({})) }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub upstream");
    let addr = listener.local_addr().expect("stub upstream addr");

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("stub upstream");
    });

    format!("http://{addr}")
}

async fn stub_flashcards(Query(params): Query<HashMap<String, String>>) -> Json<serde_json::Value> {
    let topic_id = params.get("topicId").cloned().unwrap_or_default();
    let count: usize = topic_id
        .rsplit('-')
        .next()
        .and_then(|suffix| suffix.parse().ok())
        .unwrap_or(2);

    let flashcards: Vec<serde_json::Value> = (0..count)
        .map(|i| {
            json!({
                "type": "options",
                "user": "catalog@example.com",
                "topicId": topic_id,
                "topicCode": "TC",
                "question": format!("Question {}?", i + 1),
                "options": ["a", "b", "c"],
                "rightAnswerIndex": 0,
                "id": format!("src-{}", i + 1),
            })
        })
        .collect();

    Json(json!({ "flashcards": flashcards }))
}

/// Parse a practice id out of a start-practice response body.
pub fn practice_id_from(body: &serde_json::Value) -> Uuid {
    body["practiceId"]
        .as_str()
        .and_then(|s| Uuid::parse_str(s).ok())
        .expect("response carries a practice id")
}
