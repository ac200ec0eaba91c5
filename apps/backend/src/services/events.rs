//! Publisher for practice lifecycle events.
//!
//! Events are emitted after the state change has been durably committed;
//! a publish failure is logged and never rolls anything back.

use std::time::Duration;

use serde_json::json;
use thiserror::Error;

use crate::models::PracticeResponse;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_TOPIC: &str = "practices";

pub const EVENT_PRACTICE_FINISHED: &str = "practiceFinished";

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Publish request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Event bus returned HTTP {status}: {body}")]
    HttpStatus {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// HTTP client for the event bus ingestion endpoint.
pub struct EventPublisher {
    client: reqwest::Client,
    endpoint: String,
    topic: String,
}

impl EventPublisher {
    /// Create a publisher for the given event bus URL and topic.
    pub fn new(endpoint: &str, topic: &str) -> Result<Self, PublishError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            topic: topic.to_string(),
        })
    }

    /// Create a publisher from EVENTS_ENDPOINT and EVENTS_TOPIC.
    pub fn from_env() -> Result<Self, PublishError> {
        let endpoint = std::env::var("EVENTS_ENDPOINT")
            .map_err(|_| PublishError::Config("EVENTS_ENDPOINT not set".to_string()))?;
        let topic = std::env::var("EVENTS_TOPIC").unwrap_or_else(|_| DEFAULT_TOPIC.to_string());
        Self::new(&endpoint, &topic)
    }

    /// Publish the "practice finished" event carrying the closed practice.
    pub async fn publish_practice_finished(
        &self,
        cid: &str,
        practice: &PracticeResponse,
    ) -> Result<(), PublishError> {
        let url = format!("{}/events", self.endpoint);

        let payload = json!({
            "topic": self.topic,
            "type": EVENT_PRACTICE_FINISHED,
            "id": practice.id,
            "msg": format!("Practice {} has finished", practice.id),
            "payload": practice,
        });

        let response = self
            .client
            .post(&url)
            .header("x-correlation-id", cid)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::HttpStatus { status, body });
        }

        tracing::info!(cid = %cid, practice_id = %practice.id, "published {EVENT_PRACTICE_FINISHED} event");
        Ok(())
    }
}
