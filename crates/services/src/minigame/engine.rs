use std::sync::{Arc, Mutex, PoisonError};

use trivia_core::bank::{QuestionBank, QuestionProvider};
use trivia_core::model::{
    Category, Difficulty, Question, QuestionId, QuizSession, SessionId, SessionResult,
};
use trivia_core::scoring::{RewardRules, accuracy};
use trivia_core::time::elapsed_whole_secs;

use super::sampler::{QuestionSampler, RandomSampler};
use crate::Clock;
use crate::error::MinigameError;

/// Starts, answers and scores quiz sessions.
///
/// The engine owns no session state: every operation takes a session value
/// and returns a new one.
pub struct MinigameEngine {
    provider: Arc<dyn QuestionProvider>,
    sampler: Mutex<Box<dyn QuestionSampler>>,
    clock: Clock,
    rules: RewardRules,
}

impl MinigameEngine {
    #[must_use]
    pub fn new(provider: Arc<dyn QuestionProvider>) -> Self {
        Self {
            provider,
            sampler: Mutex::new(Box::new(RandomSampler)),
            clock: Clock::default_clock(),
            rules: RewardRules::standard(),
        }
    }

    /// Engine over the bundled question bank.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(Arc::new(QuestionBank::standard()))
    }

    #[must_use]
    pub fn with_sampler(mut self, sampler: impl QuestionSampler + 'static) -> Self {
        self.sampler = Mutex::new(Box::new(sampler));
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_rules(mut self, rules: RewardRules) -> Self {
        self.rules = rules;
        self
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn rules(&self) -> &RewardRules {
        &self.rules
    }

    /// Start a session from the provider's questions for this pair.
    ///
    /// # Errors
    ///
    /// Returns `MinigameError::NoQuestions` if nothing matches.
    pub fn start_session(
        &self,
        category: Category,
        difficulty: Difficulty,
    ) -> Result<QuizSession, MinigameError> {
        let pool = self.provider.questions_for(category, difficulty);
        self.start_with_pool(category, difficulty, pool)
    }

    /// Start a session from an externally fetched pool.
    ///
    /// Entries that do not match both keys are dropped before sampling.
    ///
    /// # Errors
    ///
    /// Returns `MinigameError::NoQuestions` if no entry matches.
    pub fn start_with_pool(
        &self,
        category: Category,
        difficulty: Difficulty,
        pool: Vec<Question>,
    ) -> Result<QuizSession, MinigameError> {
        let pool: Vec<Question> = pool
            .into_iter()
            .filter(|q| q.matches(category, difficulty))
            .collect();
        if pool.is_empty() {
            return Err(MinigameError::NoQuestions {
                category,
                difficulty,
            });
        }

        let pool_size = pool.len();
        let questions = self
            .sampler
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .sample(pool, self.rules.questions_per_session());
        log::debug!(
            "minigame: drew {} of {pool_size} {category}/{difficulty} questions",
            questions.len()
        );

        let session = QuizSession::new(
            SessionId::generate(),
            category,
            difficulty,
            questions,
            self.clock.now(),
        )?;
        Ok(session)
    }

    /// Record an answer and advance to the next question.
    ///
    /// # Errors
    ///
    /// Returns `MinigameError::Session` for unknown questions, exhausted or
    /// completed sessions.
    pub fn answer_question(
        &self,
        session: &QuizSession,
        question_id: &QuestionId,
        answer: &str,
    ) -> Result<QuizSession, MinigameError> {
        Ok(session.with_answer(question_id, answer)?)
    }

    /// Stamp completion time and compute accuracy and reward.
    ///
    /// # Errors
    ///
    /// Returns `MinigameError::AlreadyCompleted` if `session` already has a
    /// completion time.
    pub fn complete_session(&self, session: &QuizSession) -> Result<SessionResult, MinigameError> {
        if session.is_completed() {
            return Err(MinigameError::AlreadyCompleted);
        }

        let completed_at = self.clock.now();
        let elapsed_secs = elapsed_whole_secs(session.started_at(), completed_at);
        let correct_answers = session.score();
        let total_questions = u32::try_from(session.total_questions()).unwrap_or(u32::MAX);
        let reward = self.rules.reward(
            session.difficulty(),
            correct_answers,
            total_questions,
            elapsed_secs,
        );

        Ok(SessionResult {
            session: session.completed(completed_at),
            correct_answers,
            total_questions,
            accuracy: accuracy(correct_answers, total_questions),
            elapsed_secs,
            reward,
        })
    }
}
