//! Client for the upstream flashcard catalog.
//!
//! The catalog is the source of truth for a topic's flashcards; a practice
//! copies them once at creation and never looks back. Calls are made with
//! the caller's own bearer credential and correlation id, and are never
//! retried here.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Catalog request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Catalog returned HTTP {status}: {body}")]
    HttpStatus {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// A flashcard as served by the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogFlashcard {
    #[serde(rename = "type")]
    pub card_type: String,
    pub user: String,
    pub topic_id: String,
    pub topic_code: String,
    pub question: String,
    pub options: Vec<String>,
    pub right_answer_index: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetFlashcardsResponse {
    pub flashcards: Vec<CatalogFlashcard>,
}

/// HTTP client for the flashcard catalog.
pub struct CatalogClient {
    client: reqwest::Client,
    endpoint: String,
}

impl CatalogClient {
    /// Create a client for the given catalog base URL.
    pub fn new(endpoint: &str) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    /// Create a client from the CARDS_API_ENDPOINT environment variable.
    pub fn from_env() -> Result<Self, CatalogError> {
        let endpoint = std::env::var("CARDS_API_ENDPOINT")
            .map_err(|_| CatalogError::Config("CARDS_API_ENDPOINT not set".to_string()))?;
        Self::new(&endpoint)
    }

    /// Fetch the flashcards of a topic, forwarding the caller's bearer
    /// credential and correlation id.
    pub async fn get_flashcards(
        &self,
        topic_id: &str,
        auth_header: &str,
        cid: &str,
    ) -> Result<GetFlashcardsResponse, CatalogError> {
        let url = format!("{}/flashcards", self.endpoint);

        let response = self
            .client
            .get(&url)
            .query(&[("topicId", topic_id)])
            .header("Authorization", auth_header)
            .header("x-correlation-id", cid)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::HttpStatus { status, body });
        }

        Ok(response.json::<GetFlashcardsResponse>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flashcard_deserializes_catalog_wire_shape() {
        let json = r#"{
            "type": "options",
            "user": "someone@example.com",
            "topicId": "t1",
            "topicCode": "HIST",
            "question": "When did it happen?",
            "options": ["1815", "1821", "1848"],
            "rightAnswerIndex": 1,
            "id": "abc123"
        }"#;

        let card: CatalogFlashcard = serde_json::from_str(json).unwrap();
        assert_eq!(card.card_type, "options");
        assert_eq!(card.topic_code, "HIST");
        assert_eq!(card.right_answer_index, 1);
        assert_eq!(card.id.as_deref(), Some("abc123"));
    }

    #[test]
    fn flashcard_id_is_optional() {
        let json = r#"{
            "type": "gaps",
            "user": "someone@example.com",
            "topicId": "t1",
            "topicCode": "HIST",
            "question": "Fill the gap",
            "options": [],
            "rightAnswerIndex": 0
        }"#;

        let card: CatalogFlashcard = serde_json::from_str(json).unwrap();
        assert!(card.id.is_none());
    }

    #[test]
    fn endpoint_trailing_slash_is_trimmed() {
        let client = CatalogClient::new("http://catalog.local/").unwrap();
        assert_eq!(client.endpoint, "http://catalog.local");
    }
}
