use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use trivia_core::model::{
    Category, Difficulty, Question, QuestionDraft, SessionId, SessionRecord, UserId, UserProfile,
};

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn db<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn u64_from_i64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn u64_to_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

/// Options are stored as a JSON array in a single TEXT column.
pub(crate) fn options_to_text(options: &[String]) -> Result<String, StorageError> {
    serde_json::to_string(options).map_err(ser)
}

pub(crate) fn map_question_row(row: &SqliteRow) -> Result<Question, StorageError> {
    let category: Category = row
        .try_get::<String, _>("category")
        .map_err(ser)?
        .parse()
        .map_err(ser)?;
    let difficulty: Difficulty = row
        .try_get::<String, _>("difficulty")
        .map_err(ser)?
        .parse()
        .map_err(ser)?;
    let options: Vec<String> =
        serde_json::from_str(&row.try_get::<String, _>("options").map_err(ser)?).map_err(ser)?;

    QuestionDraft {
        id: row.try_get("id").map_err(ser)?,
        category,
        difficulty,
        prompt: row.try_get("prompt").map_err(ser)?,
        options,
        correct_answer: row.try_get("correct_answer").map_err(ser)?,
        osm_tag: row.try_get("osm_tag").map_err(ser)?,
    }
    .validate()
    .map_err(ser)
}

pub(crate) fn map_session_row(row: &SqliteRow) -> Result<SessionRecord, StorageError> {
    Ok(SessionRecord {
        id: SessionId::new(row.try_get::<String, _>("id").map_err(ser)?),
        user_id: UserId::new(row.try_get::<String, _>("user_id").map_err(ser)?),
        category: row
            .try_get::<String, _>("category")
            .map_err(ser)?
            .parse()
            .map_err(ser)?,
        difficulty: row
            .try_get::<String, _>("difficulty")
            .map_err(ser)?
            .parse()
            .map_err(ser)?,
        score: u32_from_i64("score", row.try_get("score").map_err(ser)?)?,
        total_questions: u32_from_i64(
            "total_questions",
            row.try_get("total_questions").map_err(ser)?,
        )?,
        accuracy: row.try_get("accuracy").map_err(ser)?,
        elapsed_secs: u64_from_i64("elapsed_secs", row.try_get("elapsed_secs").map_err(ser)?)?,
        xp_earned: u32_from_i64("xp_earned", row.try_get("xp_earned").map_err(ser)?)?,
        completed_at: row.try_get("completed_at").map_err(ser)?,
    })
}

pub(crate) fn map_profile_row(row: &SqliteRow) -> Result<UserProfile, StorageError> {
    Ok(UserProfile {
        id: UserId::new(row.try_get::<String, _>("id").map_err(ser)?),
        username: row.try_get("username").map_err(ser)?,
        level: u32_from_i64("level", row.try_get("level").map_err(ser)?)?,
        xp: u64_from_i64("xp", row.try_get("xp").map_err(ser)?)?,
        total_xp: u64_from_i64("total_xp", row.try_get("total_xp").map_err(ser)?)?,
        created_at: row.try_get("created_at").map_err(ser)?,
    })
}
