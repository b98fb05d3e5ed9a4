use std::sync::Arc;

use storage::repository::DataSources;
use trivia_core::model::{
    Category, Difficulty, QuestionId, QuizSession, SessionRecord, SessionResult, UserId,
    UserProfile,
};

use super::engine::MinigameEngine;
use crate::error::MinigameError;
use crate::features::{FeatureFlag, FeatureFlags};

/// Everything produced by finishing a session.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayOutcome {
    pub result: SessionResult,
    pub record: SessionRecord,
    /// Updated profile, or `None` if the player has no profile in this source.
    pub profile: Option<UserProfile>,
}

/// Runs sessions against the active data sources and persists the outcome.
#[derive(Clone)]
pub struct MinigameLoopService {
    engine: Arc<MinigameEngine>,
    sources: DataSources,
    features: FeatureFlags,
}

impl MinigameLoopService {
    #[must_use]
    pub fn new(engine: Arc<MinigameEngine>, sources: DataSources) -> Self {
        Self {
            engine,
            sources,
            features: FeatureFlags::all(),
        }
    }

    #[must_use]
    pub fn with_features(mut self, features: FeatureFlags) -> Self {
        self.features = features;
        self
    }

    #[must_use]
    pub fn engine(&self) -> &MinigameEngine {
        &self.engine
    }

    #[must_use]
    pub fn features(&self) -> &FeatureFlags {
        &self.features
    }

    /// Start a session with questions from the data source.
    ///
    /// Falls back to the engine's own bank when the source has nothing for
    /// this pair.
    ///
    /// # Errors
    ///
    /// Returns `MinigameError::FeatureDisabled` if minigames are switched off,
    /// `MinigameError::Storage` if the fetch fails and
    /// `MinigameError::NoQuestions` if neither source has questions.
    pub async fn start(
        &self,
        category: Category,
        difficulty: Difficulty,
    ) -> Result<QuizSession, MinigameError> {
        if !self.features.is_enabled(FeatureFlag::Minigames) {
            return Err(MinigameError::FeatureDisabled(FeatureFlag::Minigames));
        }

        let limit = self.engine.rules().questions_per_session();
        let pool = self
            .sources
            .minigames
            .fetch_questions(category, difficulty, limit)
            .await?;

        match self.engine.start_with_pool(category, difficulty, pool) {
            Err(MinigameError::NoQuestions { .. }) => {
                log::info!("minigame: source has no {category}/{difficulty} questions, using bank");
                self.engine.start_session(category, difficulty)
            }
            other => other,
        }
    }

    /// Answer the session's current question.
    ///
    /// # Errors
    ///
    /// Returns `MinigameError::NotCurrentQuestion` if `question_id` is not the
    /// question at the cursor and `MinigameError::Session` if the answer
    /// cannot be recorded.
    pub fn answer(
        &self,
        session: &QuizSession,
        question_id: &QuestionId,
        answer: &str,
    ) -> Result<QuizSession, MinigameError> {
        if !session.is_completed() {
            if let Some(current) = session.current_question() {
                if current.id() != question_id {
                    return Err(MinigameError::NotCurrentQuestion {
                        id: question_id.clone(),
                    });
                }
            }
        }
        self.engine.answer_question(session, question_id, answer)
    }

    /// Complete `session`, store its record and credit the reward.
    ///
    /// # Errors
    ///
    /// Returns `MinigameError::AlreadyCompleted` for a finished session and
    /// `MinigameError::Storage` if saving or the XP update fails.
    pub async fn finish(
        &self,
        user_id: &UserId,
        session: &QuizSession,
    ) -> Result<PlayOutcome, MinigameError> {
        let result = self.engine.complete_session(session)?;
        let record = SessionRecord::from_result(user_id.clone(), &result);
        self.sources.minigames.save_session(&record).await?;

        let xp = u64::from(result.reward.total_xp);
        let profile = if self.sources.users.get_profile(user_id).await?.is_some() {
            Some(self.sources.users.add_xp(user_id, xp).await?)
        } else {
            log::info!("minigame: no profile for {user_id}, {xp} XP not credited");
            None
        };

        log::info!(
            "minigame: {user_id} finished {} with {}/{} for {xp} XP",
            record.id,
            result.correct_answers,
            result.total_questions
        );
        Ok(PlayOutcome {
            result,
            record,
            profile,
        })
    }

    /// # Errors
    ///
    /// Returns `MinigameError::Storage` if the history cannot be read.
    pub async fn history(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<SessionRecord>, MinigameError> {
        Ok(self
            .sources
            .minigames
            .session_history(user_id, limit)
            .await?)
    }

    /// # Errors
    ///
    /// Returns `MinigameError::Storage` if the profile cannot be read.
    pub async fn profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, MinigameError> {
        Ok(self.sources.users.get_profile(user_id).await?)
    }
}
