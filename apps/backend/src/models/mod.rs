//! Database models and API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use practice_core::dates::{now_stamp, today_stamp};
use practice_core::types::PracticeStats;

use crate::services::catalog::CatalogFlashcard;

// Re-export shared types from practice-core
pub use practice_core::types::PracticeType;

// === Database Entity Types ===

/// Practice session stored in PostgreSQL.
///
/// A practice is open while `finished_on` is NULL; score and statistics are
/// set exactly once, when the last flashcard is answered.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbPractice {
    pub id: Uuid,
    pub topic_id: String,
    pub user_email: String,
    pub practice_type: String,
    pub started_on: String,
    pub finished_on: Option<String>,
    pub score: Option<i32>,
    pub average_attempts: Option<f64>,
    pub total_wrong_answers: Option<i64>,
    pub num_cards: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl DbPractice {
    pub fn is_finished(&self) -> bool {
        self.finished_on.is_some()
    }

    /// Close the practice: stamp the finish date and embed score and stats.
    pub fn close(&mut self, score: i32, stats: &PracticeStats) {
        self.finished_on = Some(today_stamp());
        self.score = Some(score);
        self.average_attempts = Some(stats.average_attempts);
        self.total_wrong_answers = Some(stats.total_wrong_answers);
        self.num_cards = Some(stats.num_cards);
    }

    /// Stats block, present only once the practice has been closed.
    pub fn stats(&self) -> Option<PracticeStats> {
        match (self.average_attempts, self.total_wrong_answers, self.num_cards) {
            (Some(average_attempts), Some(total_wrong_answers), Some(num_cards)) => {
                Some(PracticeStats {
                    average_attempts,
                    total_wrong_answers,
                    num_cards,
                })
            }
            _ => None,
        }
    }

    /// Convert to the API representation.
    pub fn to_response(&self) -> PracticeResponse {
        PracticeResponse {
            id: self.id,
            topic_id: self.topic_id.clone(),
            user: self.user_email.clone(),
            practice_type: self.practice_type.clone(),
            started_on: self.started_on.clone(),
            finished_on: self.finished_on.clone(),
            score: self.score,
            stats: self.stats(),
        }
    }
}

/// New practice, before the store assigns an id.
#[derive(Debug, Clone)]
pub struct NewPractice {
    pub topic_id: String,
    pub user_email: String,
    pub practice_type: String,
    pub started_on: String,
}

impl NewPractice {
    pub fn new(topic_id: &str, user_email: &str, practice_type: PracticeType) -> Self {
        Self {
            topic_id: topic_id.to_string(),
            user_email: user_email.to_string(),
            practice_type: practice_type.as_str().to_string(),
            started_on: today_stamp(),
        }
    }
}

/// Per-practice flashcard copy stored in PostgreSQL.
///
/// Content columns are an immutable copy of the catalog flashcard taken at
/// practice creation; only the answer-progress fields ever change.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbPracticeFlashcard {
    pub id: Uuid,
    pub practice_id: Uuid,
    pub card_type: String,
    pub card_user: String,
    pub topic_id: String,
    pub topic_code: String,
    pub question: String,
    pub options: Vec<String>,
    pub right_answer_index: i32,
    pub source_id: Option<String>,
    pub num_wrong_answers: Option<i64>,
    pub correctly_answered_at: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DbPracticeFlashcard {
    pub fn is_answered(&self) -> bool {
        self.correctly_answered_at.is_some()
    }

    /// Record an answer. A correct answer stamps the timestamp and makes the
    /// record terminal; a wrong answer bumps the counter and leaves the card
    /// open. Callers must reject already-answered cards before calling this.
    pub fn record_answer(&mut self, is_correct: bool) {
        if is_correct {
            self.correctly_answered_at = Some(now_stamp());
        } else {
            self.num_wrong_answers = Some(self.num_wrong_answers.unwrap_or(0) + 1);
        }
    }

    /// Convert to the API representation.
    pub fn to_response(&self) -> FlashcardResponse {
        FlashcardResponse {
            id: self.id,
            practice_id: self.practice_id,
            card_type: self.card_type.clone(),
            user: self.card_user.clone(),
            topic_id: self.topic_id.clone(),
            topic_code: self.topic_code.clone(),
            question: self.question.clone(),
            options: self.options.clone(),
            right_answer_index: self.right_answer_index,
            source_id: self.source_id.clone(),
            num_wrong_answers: self.num_wrong_answers,
            correctly_answered_at: self.correctly_answered_at.clone(),
        }
    }
}

/// New flashcard copy, before the store assigns an id.
#[derive(Debug, Clone)]
pub struct NewPracticeFlashcard {
    pub practice_id: Uuid,
    pub card_type: String,
    pub card_user: String,
    pub topic_id: String,
    pub topic_code: String,
    pub question: String,
    pub options: Vec<String>,
    pub right_answer_index: i32,
    pub source_id: Option<String>,
}

impl NewPracticeFlashcard {
    /// Copy the content of a catalog flashcard for the given practice.
    /// Catalog edits after this point never affect the copy.
    pub fn from_catalog(practice_id: Uuid, fc: &CatalogFlashcard) -> Self {
        Self {
            practice_id,
            card_type: fc.card_type.clone(),
            card_user: fc.user.clone(),
            topic_id: fc.topic_id.clone(),
            topic_code: fc.topic_code.clone(),
            question: fc.question.clone(),
            options: fc.options.clone(),
            right_answer_index: fc.right_answer_index,
            source_id: fc.id.clone(),
        }
    }
}

// === API Request/Response Types ===

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeResponse {
    pub id: Uuid,
    pub topic_id: String,
    pub user: String,
    #[serde(rename = "type")]
    pub practice_type: String,
    pub started_on: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_on: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<PracticeStats>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardResponse {
    pub id: Uuid,
    pub practice_id: Uuid,
    #[serde(rename = "type")]
    pub card_type: String,
    pub user: String,
    pub topic_id: String,
    pub topic_code: String,
    pub question: String,
    pub options: Vec<String>,
    pub right_answer_index: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_wrong_answers: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correctly_answered_at: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartPracticeRequest {
    pub topic_id: Option<String>,
    #[serde(rename = "type")]
    pub practice_type: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartPracticeResponse {
    pub practice_id: Uuid,
    pub flashcards_inserted_count: u64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerRequest {
    pub is_correct: Option<bool>,
    pub selected_answer_index: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerResponse {
    pub is_correct: bool,
    pub finished: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<PracticeStats>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PracticesResponse {
    pub practices: Vec<PracticeResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FlashcardsResponse {
    pub flashcards: Vec<FlashcardResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletePracticeResponse {
    pub deleted_practice_count: u64,
    pub deleted_flashcard_count: u64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPracticesQuery {
    pub started_from: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OngoingPracticesQuery {
    pub topic_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TopicPracticesQuery {
    pub finished: Option<bool>,
}
