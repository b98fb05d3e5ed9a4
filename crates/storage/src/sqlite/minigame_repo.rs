use async_trait::async_trait;
use trivia_core::bank::QuestionBank;
use trivia_core::model::{Category, Difficulty, Question, SessionRecord, UserId};

use super::SqliteRepository;
use super::mapping::{db, map_question_row, map_session_row, options_to_text, u64_to_i64};
use crate::repository::{MinigameDataSource, StorageError};

impl SqliteRepository {
    /// Insert every question of `bank` that is not stored yet.
    ///
    /// Returns how many rows were inserted.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if any insert fails.
    pub async fn seed_questions(&self, bank: &QuestionBank) -> Result<usize, StorageError> {
        let mut tx = self.pool.begin().await.map_err(db)?;
        let mut inserted = 0;
        for q in bank.all() {
            let result = sqlx::query(
                r"
                INSERT OR IGNORE INTO minigame_questions (
                    id, category, difficulty, prompt, options, correct_answer, osm_tag
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ",
            )
            .bind(q.id().as_str())
            .bind(q.category().as_str())
            .bind(q.difficulty().as_str())
            .bind(q.prompt())
            .bind(options_to_text(q.options())?)
            .bind(q.correct_answer())
            .bind(q.osm_tag())
            .execute(&mut *tx)
            .await
            .map_err(db)?;
            if result.rows_affected() > 0 {
                inserted += 1;
            }
        }
        tx.commit().await.map_err(db)?;
        Ok(inserted)
    }
}

#[async_trait]
impl MinigameDataSource for SqliteRepository {
    async fn fetch_questions(
        &self,
        category: Category,
        difficulty: Difficulty,
        limit: usize,
    ) -> Result<Vec<Question>, StorageError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = sqlx::query(
            r"
            SELECT id, category, difficulty, prompt, options, correct_answer, osm_tag
            FROM minigame_questions
            WHERE category = ?1 AND difficulty = ?2
            ORDER BY RANDOM()
            LIMIT ?3
            ",
        )
        .bind(category.as_str())
        .bind(difficulty.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(db)?;

        let mut questions = Vec::with_capacity(rows.len());
        for row in &rows {
            match map_question_row(row) {
                Ok(q) => questions.push(q),
                Err(e) => log::warn!("local: skipping malformed question row: {e}"),
            }
        }
        Ok(questions)
    }

    async fn save_session(&self, record: &SessionRecord) -> Result<(), StorageError> {
        let result = sqlx::query(
            r"
            INSERT INTO minigame_sessions (
                id, user_id, category, difficulty, score, total_questions,
                accuracy, elapsed_secs, xp_earned, completed_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(id) DO NOTHING
            ",
        )
        .bind(record.id.as_str())
        .bind(record.user_id.as_str())
        .bind(record.category.as_str())
        .bind(record.difficulty.as_str())
        .bind(i64::from(record.score))
        .bind(i64::from(record.total_questions))
        .bind(record.accuracy)
        .bind(u64_to_i64("elapsed_secs", record.elapsed_secs)?)
        .bind(i64::from(record.xp_earned))
        .bind(record.completed_at)
        .execute(&self.pool)
        .await
        .map_err(db)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::Conflict);
        }
        log::info!("local: saved session {} for {}", record.id, record.user_id);
        Ok(())
    }

    async fn session_history(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<SessionRecord>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, category, difficulty, score, total_questions,
                   accuracy, elapsed_secs, xp_earned, completed_at
            FROM minigame_sessions
            WHERE user_id = ?1
            ORDER BY completed_at DESC, id DESC
            LIMIT ?2
            ",
        )
        .bind(user_id.as_str())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(db)?;

        rows.iter().map(map_session_row).collect()
    }
}
