//! Practice lifecycle endpoints

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use uuid::Uuid;

use crate::db;
use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::auth::AuthContext;
use crate::AppState;

/// POST /practices
///
/// Starts a new practice on a topic: checks that no practice is already
/// open on it, copies the topic's flashcards from the catalog and persists
/// the practice together with the copies.
pub async fn start(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<StartPracticeRequest>,
) -> Result<Json<StartPracticeResponse>> {
    let topic_id = payload
        .topic_id
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Validation("No topicId provided".to_string()))?;

    let raw_type = payload
        .practice_type
        .ok_or_else(|| ApiError::Validation("No practice type provided".to_string()))?;

    let practice_type = PracticeType::from_str(&raw_type)
        .ok_or_else(|| ApiError::Validation(format!("Invalid practice type: {raw_type}")))?;

    // Pre-check for a friendlier message; the store's partial unique index
    // is the authoritative guard below.
    if let Some(open) = state.db.find_open_practice(&topic_id).await? {
        return Err(ApiError::Conflict(format!(
            "Ongoing practice found: [ {} ] on topic {}. Close that one first.",
            open.id, topic_id
        )));
    }

    let catalog = state
        .catalog
        .get_flashcards(&topic_id, &auth.auth_header, &auth.cid)
        .await
        .map_err(|e| {
            tracing::error!(cid = %auth.cid, "flashcard catalog call failed: {e}");
            ApiError::Upstream(e.to_string())
        })?;

    let new_practice = NewPractice::new(&topic_id, &auth.user, practice_type);

    let practice_id = match state.db.insert_practice(&new_practice).await {
        Ok(id) => id,
        Err(ApiError::Database(e)) if db::is_unique_violation(&e) => {
            return Err(ApiError::Conflict(format!(
                "Ongoing practice found on topic {topic_id}. Close that one first."
            )));
        }
        Err(e) => return Err(e),
    };

    let copies: Vec<NewPracticeFlashcard> = catalog
        .flashcards
        .iter()
        .map(|fc| NewPracticeFlashcard::from_catalog(practice_id, fc))
        .collect();

    let flashcards_inserted_count = state.db.insert_flashcards(&copies).await?;

    tracing::info!(
        cid = %auth.cid,
        practice_id = %practice_id,
        "started practice on topic {topic_id} with {flashcards_inserted_count} flashcards"
    );

    Ok(Json(StartPracticeResponse {
        practice_id,
        flashcards_inserted_count,
    }))
}

/// GET /practices
pub async fn list(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
    Query(query): Query<ListPracticesQuery>,
) -> Result<Json<PracticesResponse>> {
    let practices = state
        .db
        .find_practices(query.started_from.as_deref())
        .await?;

    Ok(Json(PracticesResponse {
        practices: practices.iter().map(DbPractice::to_response).collect(),
    }))
}

/// GET /practices/ongoing
pub async fn ongoing(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
    Query(query): Query<OngoingPracticesQuery>,
) -> Result<Json<PracticesResponse>> {
    let practices = match query.topic_id.as_deref() {
        Some(topic_id) => state
            .db
            .find_open_practice(topic_id)
            .await?
            .into_iter()
            .collect(),
        None => state.db.find_open_practices().await?,
    };

    Ok(Json(PracticesResponse {
        practices: practices.iter().map(DbPractice::to_response).collect(),
    }))
}

/// GET /practices/:practice_id
pub async fn get_practice(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
    Path(practice_id): Path<Uuid>,
) -> Result<Json<PracticeResponse>> {
    let practice = state
        .db
        .get_practice(practice_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Practice {practice_id} not found")))?;

    Ok(Json(practice.to_response()))
}

/// GET /topics/:topic_id/practices
pub async fn by_topic(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
    Path(topic_id): Path<String>,
    Query(query): Query<TopicPracticesQuery>,
) -> Result<Json<PracticesResponse>> {
    let only_finished = query.finished.unwrap_or(false);
    let practices = state
        .db
        .find_practices_by_topic(&topic_id, only_finished)
        .await?;

    Ok(Json(PracticesResponse {
        practices: practices.iter().map(DbPractice::to_response).collect(),
    }))
}

/// GET /topics/:topic_id/practices/latestFinished
pub async fn latest_finished(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
    Path(topic_id): Path<String>,
) -> Result<Json<PracticeResponse>> {
    let practice = state
        .db
        .find_latest_finished_practice(&topic_id)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!("No finished practice found for topic {topic_id}"))
        })?;

    Ok(Json(practice.to_response()))
}

/// GET /practices/:practice_id/flashcards
pub async fn flashcards(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
    Path(practice_id): Path<Uuid>,
) -> Result<Json<FlashcardsResponse>> {
    let flashcards = state.db.get_practice_flashcards(practice_id).await?;

    Ok(Json(FlashcardsResponse {
        flashcards: flashcards
            .iter()
            .map(DbPracticeFlashcard::to_response)
            .collect(),
    }))
}

/// DELETE /practices/:practice_id
///
/// Deletes the practice and cascades to its flashcards.
pub async fn delete_practice(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(practice_id): Path<Uuid>,
) -> Result<Json<DeletePracticeResponse>> {
    let (deleted_practice_count, deleted_flashcard_count) =
        state.db.delete_practice_cascade(practice_id).await?;

    tracing::info!(
        cid = %auth.cid,
        "deleted [{deleted_practice_count}] practice and [{deleted_flashcard_count}] flashcards"
    );

    Ok(Json(DeletePracticeResponse {
        deleted_practice_count,
        deleted_flashcard_count,
    }))
}
