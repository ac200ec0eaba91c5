//! PostgreSQL store for practices and their flashcard copies

use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;

/// Database wrapper with connection pool
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

/// True when the error is a Postgres unique violation, i.e. the partial
/// unique index on open practices fired during a concurrent start.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db_err| db_err.code())
        .is_some_and(|code| code == "23505")
}

impl Database {
    /// Connect to PostgreSQL and create connection pool
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ApiError::Migration(e.to_string()))?;
        Ok(())
    }

    /// Get the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // === Practice Repository ===

    /// Insert a new open practice, returning the assigned id.
    ///
    /// The partial unique index on (topic_id) WHERE finished_on IS NULL
    /// rejects a second open practice on the same topic; callers translate
    /// that unique violation into a conflict.
    pub async fn insert_practice(&self, practice: &NewPractice) -> Result<Uuid> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO practices (topic_id, user_email, practice_type, started_on)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&practice.topic_id)
        .bind(&practice.user_email)
        .bind(&practice.practice_type)
        .bind(&practice.started_on)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    /// Get a practice by id
    pub async fn get_practice(&self, practice_id: Uuid) -> Result<Option<DbPractice>> {
        let practice = sqlx::query_as::<_, DbPractice>(
            r#"
            SELECT id, topic_id, user_email, practice_type, started_on, finished_on,
                   score, average_attempts, total_wrong_answers, num_cards, created_at
            FROM practices
            WHERE id = $1
            "#,
        )
        .bind(practice_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(practice)
    }

    /// Find the open practice on a topic, if any
    pub async fn find_open_practice(&self, topic_id: &str) -> Result<Option<DbPractice>> {
        let practice = sqlx::query_as::<_, DbPractice>(
            r#"
            SELECT id, topic_id, user_email, practice_type, started_on, finished_on,
                   score, average_attempts, total_wrong_answers, num_cards, created_at
            FROM practices
            WHERE topic_id = $1 AND finished_on IS NULL
            "#,
        )
        .bind(topic_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(practice)
    }

    /// Find all open practices, across topics
    pub async fn find_open_practices(&self) -> Result<Vec<DbPractice>> {
        let practices = sqlx::query_as::<_, DbPractice>(
            r#"
            SELECT id, topic_id, user_email, practice_type, started_on, finished_on,
                   score, average_attempts, total_wrong_answers, num_cards, created_at
            FROM practices
            WHERE finished_on IS NULL
            ORDER BY started_on DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(practices)
    }

    /// Find the practices of a topic, optionally restricted to finished ones
    pub async fn find_practices_by_topic(
        &self,
        topic_id: &str,
        only_finished: bool,
    ) -> Result<Vec<DbPractice>> {
        let practices = if only_finished {
            sqlx::query_as::<_, DbPractice>(
                r#"
                SELECT id, topic_id, user_email, practice_type, started_on, finished_on,
                       score, average_attempts, total_wrong_answers, num_cards, created_at
                FROM practices
                WHERE topic_id = $1 AND finished_on IS NOT NULL
                ORDER BY started_on DESC
                "#,
            )
            .bind(topic_id)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, DbPractice>(
                r#"
                SELECT id, topic_id, user_email, practice_type, started_on, finished_on,
                       score, average_attempts, total_wrong_answers, num_cards, created_at
                FROM practices
                WHERE topic_id = $1
                ORDER BY started_on DESC
                "#,
            )
            .bind(topic_id)
            .fetch_all(&self.pool)
            .await?
        };

        Ok(practices)
    }

    /// Find the most recently finished practice of a topic
    pub async fn find_latest_finished_practice(
        &self,
        topic_id: &str,
    ) -> Result<Option<DbPractice>> {
        let practice = sqlx::query_as::<_, DbPractice>(
            r#"
            SELECT id, topic_id, user_email, practice_type, started_on, finished_on,
                   score, average_attempts, total_wrong_answers, num_cards, created_at
            FROM practices
            WHERE topic_id = $1 AND finished_on IS NOT NULL
            ORDER BY finished_on DESC
            LIMIT 1
            "#,
        )
        .bind(topic_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(practice)
    }

    /// Find all practices, optionally from a minimum start date (YYYYMMDD)
    pub async fn find_practices(&self, started_from: Option<&str>) -> Result<Vec<DbPractice>> {
        let practices = match started_from {
            Some(from) => {
                sqlx::query_as::<_, DbPractice>(
                    r#"
                    SELECT id, topic_id, user_email, practice_type, started_on, finished_on,
                           score, average_attempts, total_wrong_answers, num_cards, created_at
                    FROM practices
                    WHERE started_on >= $1
                    ORDER BY started_on DESC
                    "#,
                )
                .bind(from)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, DbPractice>(
                    r#"
                    SELECT id, topic_id, user_email, practice_type, started_on, finished_on,
                           score, average_attempts, total_wrong_answers, num_cards, created_at
                    FROM practices
                    ORDER BY started_on DESC
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(practices)
    }

    /// Persist the closure of a practice: finish date, score, stats.
    ///
    /// Returns the modified count. The finished_on guard makes the closure a
    /// one-time transition; callers treat 0 as an internal failure.
    pub async fn close_practice(&self, practice: &DbPractice) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE practices
            SET finished_on = $2, score = $3, average_attempts = $4,
                total_wrong_answers = $5, num_cards = $6
            WHERE id = $1 AND finished_on IS NULL
            "#,
        )
        .bind(practice.id)
        .bind(&practice.finished_on)
        .bind(practice.score)
        .bind(practice.average_attempts)
        .bind(practice.total_wrong_answers)
        .bind(practice.num_cards)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Delete a practice and all its flashcards in one transaction,
    /// returning (deleted practices, deleted flashcards).
    pub async fn delete_practice_cascade(&self, practice_id: Uuid) -> Result<(u64, u64)> {
        let mut tx = self.pool.begin().await?;

        let practices = sqlx::query("DELETE FROM practices WHERE id = $1")
            .bind(practice_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let flashcards = sqlx::query("DELETE FROM practice_flashcards WHERE practice_id = $1")
            .bind(practice_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        Ok((practices, flashcards))
    }

    // === Practice Flashcard Repository ===

    /// Insert a single flashcard copy
    pub async fn insert_flashcard(&self, flashcard: &NewPracticeFlashcard) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO practice_flashcards (practice_id, card_type, card_user, topic_id,
                                             topic_code, question, options, right_answer_index,
                                             source_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(flashcard.practice_id)
        .bind(&flashcard.card_type)
        .bind(&flashcard.card_user)
        .bind(&flashcard.topic_id)
        .bind(&flashcard.topic_code)
        .bind(&flashcard.question)
        .bind(&flashcard.options)
        .bind(flashcard.right_answer_index)
        .bind(&flashcard.source_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert a batch of flashcard copies, returning the inserted count
    pub async fn insert_flashcards(&self, flashcards: &[NewPracticeFlashcard]) -> Result<u64> {
        let mut count = 0;
        for flashcard in flashcards {
            self.insert_flashcard(flashcard).await?;
            count += 1;
        }
        Ok(count)
    }

    /// Get a single flashcard of a practice
    pub async fn get_flashcard(
        &self,
        practice_id: Uuid,
        flashcard_id: Uuid,
    ) -> Result<Option<DbPracticeFlashcard>> {
        let flashcard = sqlx::query_as::<_, DbPracticeFlashcard>(
            r#"
            SELECT id, practice_id, card_type, card_user, topic_id, topic_code,
                   question, options, right_answer_index, source_id,
                   num_wrong_answers, correctly_answered_at, created_at
            FROM practice_flashcards
            WHERE id = $1 AND practice_id = $2
            "#,
        )
        .bind(flashcard_id)
        .bind(practice_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(flashcard)
    }

    /// Get all flashcards of a practice
    pub async fn get_practice_flashcards(
        &self,
        practice_id: Uuid,
    ) -> Result<Vec<DbPracticeFlashcard>> {
        let flashcards = sqlx::query_as::<_, DbPracticeFlashcard>(
            r#"
            SELECT id, practice_id, card_type, card_user, topic_id, topic_code,
                   question, options, right_answer_index, source_id,
                   num_wrong_answers, correctly_answered_at, created_at
            FROM practice_flashcards
            WHERE practice_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(practice_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(flashcards)
    }

    /// Count the flashcards of a practice still lacking a correct answer
    pub async fn count_unanswered_flashcards(&self, practice_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM practice_flashcards
            WHERE practice_id = $1 AND correctly_answered_at IS NULL
            "#,
        )
        .bind(practice_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Persist the answer-progress fields of a flashcard.
    ///
    /// Returns the modified count; callers treat 0 as an internal failure,
    /// never as a silent no-op.
    pub async fn update_flashcard_answer(&self, flashcard: &DbPracticeFlashcard) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE practice_flashcards
            SET num_wrong_answers = $3, correctly_answered_at = $4
            WHERE id = $1 AND practice_id = $2
            "#,
        )
        .bind(flashcard.id)
        .bind(flashcard.practice_id)
        .bind(flashcard.num_wrong_answers)
        .bind(&flashcard.correctly_answered_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
