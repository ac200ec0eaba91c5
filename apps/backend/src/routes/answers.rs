//! Answer submission and practice completion

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;

use practice_core::scoring::{compute_practice_score, compute_practice_stats};

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::auth::AuthContext;
use crate::AppState;

/// POST /practices/:practice_id/flashcards/:flashcard_id/answer
///
/// Records an answer to a flashcard. A correct answer makes the card
/// terminal; a wrong one bumps its counter and leaves it open. When the
/// last card of the practice receives its correct answer, the practice is
/// closed with its score and statistics and a "practice finished" event is
/// published.
pub async fn submit(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((practice_id, flashcard_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<SubmitAnswerRequest>,
) -> Result<Json<SubmitAnswerResponse>> {
    let is_correct = payload
        .is_correct
        .ok_or_else(|| ApiError::Validation("No isCorrect provided".to_string()))?;

    tracing::info!(
        cid = %auth.cid,
        practice_id = %practice_id,
        flashcard_id = %flashcard_id,
        selected_answer_index = ?payload.selected_answer_index,
        "processing answer from {}",
        auth.user
    );

    let mut card = state
        .db
        .get_flashcard(practice_id, flashcard_id)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!(
                "Flashcard {flashcard_id} not found for practice {practice_id}"
            ))
        })?;

    if card.is_answered() {
        return Err(ApiError::Validation(format!(
            "Flashcard {flashcard_id} already answered"
        )));
    }

    card.record_answer(is_correct);

    let modified = state.db.update_flashcard_answer(&card).await?;
    if modified == 0 {
        return Err(ApiError::Internal(format!(
            "Flashcard {flashcard_id} was not updated after answering"
        )));
    }

    let finished = state.db.count_unanswered_flashcards(practice_id).await? == 0;

    tracing::info!(
        cid = %auth.cid,
        practice_id = %practice_id,
        "practice is {}",
        if finished { "finished" } else { "not finished" }
    );

    if !finished {
        return Ok(Json(SubmitAnswerResponse {
            is_correct,
            finished: false,
            score: None,
            stats: None,
        }));
    }

    // Last card answered: close the practice with score and statistics.
    let mut practice = state
        .db
        .get_practice(practice_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Practice {practice_id} not found")))?;

    let flashcards = state.db.get_practice_flashcards(practice_id).await?;
    let wrong_counts: Vec<Option<i64>> =
        flashcards.iter().map(|fc| fc.num_wrong_answers).collect();

    let score = compute_practice_score(&wrong_counts);
    let stats = compute_practice_stats(&wrong_counts);

    practice.close(score, &stats);

    let modified = state.db.close_practice(&practice).await?;
    if modified == 0 {
        return Err(ApiError::Internal(format!(
            "Practice {practice_id} was not updated on closure"
        )));
    }

    tracing::info!(
        cid = %auth.cid,
        practice_id = %practice_id,
        "practice closed at {} with score {score}",
        practice.finished_on.as_deref().unwrap_or("-")
    );

    // Closure is durably committed; a publish failure only gets logged.
    if let Err(e) = state
        .publisher
        .publish_practice_finished(&auth.cid, &practice.to_response())
        .await
    {
        tracing::error!(cid = %auth.cid, practice_id = %practice_id, "failed to publish practice finished event: {e}");
    }

    Ok(Json(SubmitAnswerResponse {
        is_correct,
        finished: true,
        score: Some(score),
        stats: Some(stats),
    }))
}
