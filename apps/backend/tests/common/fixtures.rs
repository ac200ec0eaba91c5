//! Test fixtures and factory functions for creating test data.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::json;
use uuid::Uuid;

/// Default test caller.
pub const TEST_USER: &str = "test@example.com";

/// Build an unsigned JWT carrying the given email claim.
///
/// The service trusts the gateway for signature verification, so an
/// arbitrary signature segment is enough for tests.
pub fn jwt(email: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(json!({ "email": email }).to_string().as_bytes());
    format!("{header}.{payload}.testsignature")
}

/// Generate a unique topic id whose numeric suffix tells the stub catalog
/// how many flashcards to serve.
pub fn unique_topic(card_count: usize) -> String {
    format!(
        "topic-{}-{}",
        &Uuid::new_v4().to_string()[..8],
        card_count
    )
}

/// Create a start-practice request body.
pub fn start_practice_request(topic_id: &str, practice_type: &str) -> serde_json::Value {
    json!({ "topicId": topic_id, "type": practice_type })
}

/// Create an answer request body.
pub fn answer_request(is_correct: bool) -> serde_json::Value {
    json!({ "isCorrect": is_correct, "selectedAnswerIndex": 0 })
}
