use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use trivia_core::model::{
    Category, Difficulty, ProfileUpdate, Question, QuestionDraft, SessionRecord, UserId,
    UserProfile,
};

use super::lock;
use crate::repository::{MinigameDataSource, StorageError, UserDataSource, history_from};

pub const MOCK_USER_ID: &str = "mock-user-1";

const PLACEHOLDER_OPTIONS: [&str; 4] = ["Option A", "Option B", "Option C", "Option D"];

fn mock_questions() -> Vec<QuestionDraft> {
    vec![
        QuestionDraft {
            id: "mock-1".into(),
            category: Category::OsmTrivia,
            difficulty: Difficulty::Easy,
            prompt: "Mock question: what is an amenity=cafe?".into(),
            options: vec!["Cafe".into(), "Restaurant".into(), "Bar".into(), "Shop".into()],
            correct_answer: "Cafe".into(),
            osm_tag: Some("amenity=cafe".into()),
        },
        QuestionDraft {
            id: "mock-2".into(),
            category: Category::OsmTrivia,
            difficulty: Difficulty::Easy,
            prompt: "Mock question: what is a shop=bakery?".into(),
            options: vec![
                "Bakery".into(),
                "Supermarket".into(),
                "Butcher".into(),
                "Pharmacy".into(),
            ],
            correct_answer: "Bakery".into(),
            osm_tag: Some("shop=bakery".into()),
        },
        QuestionDraft {
            id: "mock-3".into(),
            category: Category::TagPuzzle,
            difficulty: Difficulty::Medium,
            prompt: "Mock question: find the tag for a football pitch".into(),
            options: vec![
                "sport=soccer".into(),
                "leisure=pitch".into(),
                "amenity=sports".into(),
                "sport=field".into(),
            ],
            correct_answer: "leisure=pitch".into(),
            osm_tag: Some("leisure=pitch".into()),
        },
    ]
}

fn placeholder(index: usize, category: Category, difficulty: Difficulty) -> QuestionDraft {
    QuestionDraft {
        id: format!("mock-generated-{index}"),
        category,
        difficulty,
        prompt: format!("Mock question {}", index + 1),
        options: PLACEHOLDER_OPTIONS.iter().map(|o| (*o).to_owned()).collect(),
        correct_answer: PLACEHOLDER_OPTIONS[0].to_owned(),
        osm_tag: None,
    }
}

/// Synthetic questions for UI work; always returns exactly `limit` questions.
///
/// When the fixed mock set has fewer matches than requested, the rest is
/// filled with generated placeholders.
#[derive(Clone, Default)]
pub struct MockMinigameSource {
    sessions: Arc<Mutex<Vec<SessionRecord>>>,
}

impl MockMinigameSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MinigameDataSource for MockMinigameSource {
    async fn fetch_questions(
        &self,
        category: Category,
        difficulty: Difficulty,
        limit: usize,
    ) -> Result<Vec<Question>, StorageError> {
        let mut drafts: Vec<QuestionDraft> = mock_questions()
            .into_iter()
            .filter(|q| q.category == category && q.difficulty == difficulty)
            .take(limit)
            .collect();

        while drafts.len() < limit {
            drafts.push(placeholder(drafts.len(), category, difficulty));
        }

        drafts
            .into_iter()
            .map(|d| {
                d.validate()
                    .map_err(|e| StorageError::Serialization(e.to_string()))
            })
            .collect()
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

/// A single mutable mock profile.
#[derive(Clone)]
pub struct MockUserSource {
    profile: Arc<Mutex<UserProfile>>,
}

impl Default for MockUserSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockUserSource {
    #[must_use]
    pub fn new() -> Self {
        Self::created_at(Utc::now())
    }

    #[must_use]
    pub fn created_at(at: DateTime<Utc>) -> Self {
        Self {
            profile: Arc::new(Mutex::new(UserProfile {
                id: UserId::new(MOCK_USER_ID),
                username: "MockPlayer".into(),
                level: 1,
                xp: 0,
                total_xp: 0,
                created_at: at,
            })),
        }
    }
}

#[async_trait]
impl UserDataSource for MockUserSource {
    async fn get_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, StorageError> {
        let guard = lock(&self.profile)?;
        Ok((&guard.id == user_id).then(|| guard.clone()))
    }

    async fn update_profile(
        &self,
        user_id: &UserId,
        update: ProfileUpdate,
    ) -> Result<UserProfile, StorageError> {
        let mut guard = lock(&self.profile)?;
        if &guard.id != user_id {
            return Err(StorageError::NotFound);
        }
        *guard = guard.clone().apply(update);
        Ok(guard.clone())
    }

    async fn add_xp(&self, user_id: &UserId, xp: u64) -> Result<UserProfile, StorageError> {
        let mut guard = lock(&self.profile)?;
        if &guard.id != user_id {
            return Err(StorageError::NotFound);
        }
        *guard = guard.clone().with_xp_added(xp);
        Ok(guard.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trivia_core::model::SessionId;
    use trivia_core::time::fixed_now;

    #[tokio::test]
    async fn returns_exactly_limit_questions() {
        let source = MockMinigameSource::new();
        let questions = source
            .fetch_questions(Category::OsmTrivia, Difficulty::Easy, 5)
            .await
            .unwrap();
        assert_eq!(questions.len(), 5);
        assert_eq!(questions[0].id().as_str(), "mock-1");
        assert_eq!(questions[2].id().as_str(), "mock-generated-2");
    }

    #[tokio::test]
    async fn pads_unknown_pairs_with_placeholders() {
        let source = MockMinigameSource::new();
        let questions = source
            .fetch_questions(Category::TagPuzzle, Difficulty::Hard, 10)
            .await
            .unwrap();
        assert_eq!(questions.len(), 10);
        assert!(questions.iter().all(|q| q.correct_answer() == "Option A"));
        assert!(
            questions
                .iter()
                .all(|q| q.matches(Category::TagPuzzle, Difficulty::Hard))
        );
    }

    #[tokio::test]
    async fn saves_and_reads_sessions() {
        let source = MockMinigameSource::new();
        let record = SessionRecord {
            id: SessionId::new("mock-session-1"),
            user_id: UserId::new("mock-user"),
            category: Category::OsmTrivia,
            difficulty: Difficulty::Medium,
            score: 3,
            total_questions: 5,
            accuracy: 60.0,
            elapsed_secs: 90,
            xp_earned: 60,
            completed_at: fixed_now(),
        };
        source.save_session(&record).await.unwrap();

        let history = source
            .session_history(&UserId::new("mock-user"), 10)
            .await
            .unwrap();
        assert_eq!(history, vec![record]);
    }

    #[tokio::test]
    async fn only_the_mock_user_exists() {
        let users = MockUserSource::created_at(fixed_now());
        let profile = users
            .get_profile(&UserId::new(MOCK_USER_ID))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(profile.username, "MockPlayer");
        assert_eq!(profile.level, 1);
        assert!(
            users
                .get_profile(&UserId::new("other-user"))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn xp_accumulates_on_the_mock_profile() {
        let users = MockUserSource::created_at(fixed_now());
        let id = UserId::new(MOCK_USER_ID);
        users.add_xp(&id, 150).await.unwrap();

        let profile = users.get_profile(&id).await.unwrap().unwrap();
        assert_eq!(profile.xp, 150);
        assert_eq!(profile.total_xp, 150);
        assert_eq!(profile.level, 2);
    }

    #[tokio::test]
    async fn rename_is_persisted() {
        let users = MockUserSource::created_at(fixed_now());
        let updated = users
            .update_profile(
                &UserId::new(MOCK_USER_ID),
                ProfileUpdate::username("NewMockPlayer"),
            )
            .await
            .unwrap();
        assert_eq!(updated.username, "NewMockPlayer");
    }
}
