use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use trivia_core::bank::QuestionBank;
use trivia_core::model::{
    Category, Difficulty, ProfileUpdate, Question, SessionRecord, UserId, UserProfile,
};

use super::lock;
use crate::repository::{MinigameDataSource, StorageError, UserDataSource, history_from};

pub const SEED_USER_ID: &str = "seed-user-1";

/// Questions from the bundled bank; sessions kept in memory.
#[derive(Clone)]
pub struct SeedMinigameSource {
    bank: Arc<QuestionBank>,
    sessions: Arc<Mutex<Vec<SessionRecord>>>,
}

impl Default for SeedMinigameSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SeedMinigameSource {
    #[must_use]
    pub fn new() -> Self {
        Self::with_bank(QuestionBank::standard())
    }

    #[must_use]
    pub fn with_bank(bank: QuestionBank) -> Self {
        Self {
            bank: Arc::new(bank),
            sessions: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl MinigameDataSource for SeedMinigameSource {
    async fn fetch_questions(
        &self,
        category: Category,
        difficulty: Difficulty,
        limit: usize,
    ) -> Result<Vec<Question>, StorageError> {
        let mut pool: Vec<Question> = self.bank.matching(category, difficulty).cloned().collect();
        pool.shuffle(&mut rand::rng());
        pool.truncate(limit);
        log::debug!(
            "seed: {} {category}/{difficulty} questions selected",
            pool.len()
        );
        Ok(pool)
    }

    async fn save_session(&self, record: &SessionRecord) -> Result<(), StorageError> {
        lock(&self.sessions)?.push(record.clone());
        Ok(())
    }

    async fn session_history(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<SessionRecord>, StorageError> {
        let guard = lock(&self.sessions)?;
        Ok(history_from(&guard, user_id, limit))
    }
}

/// In-memory profiles pre-populated with the seed player.
#[derive(Clone)]
pub struct SeedUserSource {
    profiles: Arc<Mutex<HashMap<UserId, UserProfile>>>,
}

impl Default for SeedUserSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SeedUserSource {
    #[must_use]
    pub fn new() -> Self {
        Self::created_at(Utc::now())
    }

    /// Seed profile stamped with a fixed creation time.
    #[must_use]
    pub fn created_at(at: DateTime<Utc>) -> Self {
        let seed = UserProfile {
            id: UserId::new(SEED_USER_ID),
            username: "SeedPlayer".into(),
            level: 5,
            xp: 250,
            total_xp: 1250,
            created_at: at,
        };
        let mut profiles = HashMap::new();
        profiles.insert(seed.id.clone(), seed);
        Self {
            profiles: Arc::new(Mutex::new(profiles)),
        }
    }
}

#[async_trait]
impl UserDataSource for SeedUserSource {
    async fn get_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, StorageError> {
        Ok(lock(&self.profiles)?.get(user_id).cloned())
    }

    async fn update_profile(
        &self,
        user_id: &UserId,
        update: ProfileUpdate,
    ) -> Result<UserProfile, StorageError> {
        let mut guard = lock(&self.profiles)?;
        let existing = guard.get(user_id).cloned().ok_or(StorageError::NotFound)?;
        let updated = existing.apply(update);
        guard.insert(user_id.clone(), updated.clone());
        Ok(updated)
    }

    async fn add_xp(&self, user_id: &UserId, xp: u64) -> Result<UserProfile, StorageError> {
        let mut guard = lock(&self.profiles)?;
        let profile = guard.get_mut(user_id).ok_or(StorageError::NotFound)?;
        *profile = profile.clone().with_xp_added(xp);
        Ok(profile.clone())
    }
}
