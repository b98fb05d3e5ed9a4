use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Category, Difficulty, SessionId, SessionResult, UserId};

/// Summary row handed to the data source once a result is produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: SessionId,
    pub user_id: UserId,
    #[serde(rename = "type")]
    pub category: Category,
    pub difficulty: Difficulty,
    pub score: u32,
    pub total_questions: u32,
    pub accuracy: f64,
    #[serde(rename = "timeElapsed")]
    pub elapsed_secs: u64,
    pub xp_earned: u32,
    pub completed_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Assemble the persisted summary for `user_id` from a result.
    ///
    /// Falls back to `started_at` for the completion time if the embedded
    /// session was never stamped.
    #[must_use]
    pub fn from_result(user_id: UserId, result: &SessionResult) -> Self {
        let session = &result.session;
        Self {
            id: session.id().clone(),
            user_id,
            category: session.category(),
            difficulty: session.difficulty(),
            score: result.correct_answers,
            total_questions: result.total_questions,
            accuracy: result.accuracy_rounded(),
            elapsed_secs: result.elapsed_secs,
            xp_earned: result.reward.total_xp,
            completed_at: session.completed_at().unwrap_or_else(|| session.started_at()),
        }
    }
}
