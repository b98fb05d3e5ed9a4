use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use trivia_core::model::{
    Category, Difficulty, ProfileUpdate, Question, SessionRecord, UserId, UserProfile,
};

/// History length used when a caller does not ask for a specific limit.
pub const DEFAULT_HISTORY_LIMIT: u32 = 10;

/// Errors surfaced by data-source adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("remote responded with status {status}")]
    Http { status: u16 },

    #[error("data source is not configured: missing {0}")]
    NotConfigured(&'static str),
}

/// Question and session-history side of the data-source port.
#[async_trait]
pub trait MinigameDataSource: Send + Sync {
    /// Fetch up to `limit` questions matching both keys.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn fetch_questions(
        &self,
        category: Category,
        difficulty: Difficulty,
        limit: usize,
    ) -> Result<Vec<Question>, StorageError>;

    /// Append a completed session summary.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn save_session(&self, record: &SessionRecord) -> Result<(), StorageError>;

    /// Most recent sessions for `user_id`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn session_history(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<SessionRecord>, StorageError>;
}

/// Profile side of the data-source port.
#[async_trait]
pub trait UserDataSource: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, StorageError>;

    /// Apply a partial update and return the stored profile.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` for unknown users.
    async fn update_profile(
        &self,
        user_id: &UserId,
        update: ProfileUpdate,
    ) -> Result<UserProfile, StorageError>;

    /// Credit `xp` and recompute the level.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` for unknown users.
    async fn add_xp(&self, user_id: &UserId, xp: u64) -> Result<UserProfile, StorageError> {
        let profile = self
            .get_profile(user_id)
            .await?
            .ok_or(StorageError::NotFound)?;
        self.update_profile(user_id, ProfileUpdate::xp_gain(&profile, xp))
            .await
    }
}

/// The pair of adapters active for one data-source mode.
#[derive(Clone)]
pub struct DataSources {
    pub minigames: Arc<dyn MinigameDataSource>,
    pub users: Arc<dyn UserDataSource>,
}

impl DataSources {
    #[must_use]
    pub fn new(minigames: Arc<dyn MinigameDataSource>, users: Arc<dyn UserDataSource>) -> Self {
        Self { minigames, users }
    }

    /// True if both bundles point at the same adapter instances.
    #[must_use]
    pub fn same_instances(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.minigames, &other.minigames) && Arc::ptr_eq(&self.users, &other.users)
    }
}

/// Newest-first, truncated view over in-memory session records.
pub(crate) fn history_from(
    records: &[SessionRecord],
    user_id: &UserId,
    limit: u32,
) -> Vec<SessionRecord> {
    let mut matching: Vec<SessionRecord> = records
        .iter()
        .filter(|r| &r.user_id == user_id)
        .cloned()
        .collect();
    matching.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
    matching.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
    matching
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use trivia_core::model::SessionId;
    use trivia_core::time::fixed_now;

    fn record(id: &str, user: &str, minutes_ago: i64) -> SessionRecord {
        SessionRecord {
            id: SessionId::new(id),
            user_id: UserId::new(user),
            category: Category::OsmTrivia,
            difficulty: Difficulty::Easy,
            score: 1,
            total_questions: 5,
            accuracy: 20.0,
            elapsed_secs: 10,
            xp_earned: 10,
            completed_at: fixed_now() - Duration::minutes(minutes_ago),
        }
    }

    #[test]
    fn history_is_filtered_sorted_and_limited() {
        let records = vec![
            record("old", "u1", 30),
            record("other", "u2", 0),
            record("new", "u1", 1),
            record("mid", "u1", 10),
        ];

        let history = history_from(&records, &UserId::new("u1"), 2);
        let ids: Vec<_> = history.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "mid"]);
    }
}
