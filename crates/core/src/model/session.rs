use chrono::{DateTime, Utc};
use std::collections::HashMap;
use thiserror::Error;

use crate::model::{Category, Difficulty, Question, QuestionId, SessionId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("a session needs at least one question")]
    Empty,

    #[error("question not found: {id}")]
    QuestionNotFound { id: QuestionId },

    #[error("all {total} questions have already been answered")]
    Exhausted { total: usize },

    #[error("session already completed")]
    Completed,
}

/// One attempt at a fixed-size quiz drawn from a single category/difficulty.
///
/// Sessions are values: answering returns a new `QuizSession` and leaves the
/// receiver untouched, so a caller can keep the previous snapshot for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSession {
    id: SessionId,
    category: Category,
    difficulty: Difficulty,
    questions: Vec<Question>,
    current_question_index: usize,
    score: u32,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    answers: HashMap<QuestionId, String>,
}

impl QuizSession {
    /// Create a fresh session positioned at the first question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if `questions` is empty.
    pub fn new(
        id: SessionId,
        category: Category,
        difficulty: Difficulty,
        questions: Vec<Question>,
        started_at: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::Empty);
        }

        Ok(Self {
            id,
            category,
            difficulty,
            questions,
            current_question_index: 0,
            score: 0,
            started_at,
            completed_at: None,
            answers: HashMap::new(),
        })
    }

    #[must_use]
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    #[must_use]
    pub fn category(&self) -> Category {
        self.category
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn current_question_index(&self) -> usize {
        self.current_question_index
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn answers(&self) -> &HashMap<QuestionId, String> {
        &self.answers
    }

    #[must_use]
    pub fn answer_for(&self, id: &QuestionId) -> Option<&str> {
        self.answers.get(id).map(String::as_str)
    }

    /// The question under the cursor, or `None` once every question is answered.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_question_index)
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.questions.len().saturating_sub(self.current_question_index)
    }

    /// True once the cursor has reached the end of the question list.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.current_question_index >= self.questions.len()
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Record `answer` for `question_id` and advance the cursor by one.
    ///
    /// The score goes up by one only on an exact match with the correct answer.
    /// Any id in the session is accepted, so answering an id twice overwrites
    /// its entry and can score again. Callers that allow one answer per
    /// question check `current_question` first.
    ///
    /// # Errors
    ///
    /// - `SessionError::Completed` if the session already has a completion time.
    /// - `SessionError::Exhausted` if every question has been answered.
    /// - `SessionError::QuestionNotFound` if `question_id` is not in this session.
    pub fn with_answer(
        &self,
        question_id: &QuestionId,
        answer: &str,
    ) -> Result<Self, SessionError> {
        if self.is_completed() {
            return Err(SessionError::Completed);
        }
        if self.is_exhausted() {
            return Err(SessionError::Exhausted {
                total: self.questions.len(),
            });
        }
        let question = self
            .questions
            .iter()
            .find(|q| q.id() == question_id)
            .ok_or_else(|| SessionError::QuestionNotFound {
                id: question_id.clone(),
            })?;

        let mut next = self.clone();
        if question.is_correct(answer) {
            next.score = next.score.saturating_add(1);
        }
        next.answers.insert(question_id.clone(), answer.to_owned());
        next.current_question_index += 1;
        Ok(next)
    }

    /// Copy of this session stamped with a completion time.
    #[must_use]
    pub fn completed(&self, at: DateTime<Utc>) -> Self {
        Self {
            completed_at: Some(at),
            ..self.clone()
        }
    }

    /// Copy with a different start time; used to replay or simulate timing.
    #[must_use]
    pub fn with_started_at(&self, started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionDraft;
    use crate::time::fixed_now;

    fn question(id: &str) -> Question {
        QuestionDraft {
            id: id.into(),
            category: Category::TagPuzzle,
            difficulty: Difficulty::Medium,
            prompt: format!("Prompt {id}"),
            options: vec!["right".into(), "wrong".into(), "other".into()],
            correct_answer: "right".into(),
            osm_tag: None,
        }
        .validate()
        .unwrap()
    }

    fn session(n: usize) -> QuizSession {
        let questions = (1..=n).map(|i| question(&format!("q{i}"))).collect();
        QuizSession::new(
            SessionId::new("s-1"),
            Category::TagPuzzle,
            Difficulty::Medium,
            questions,
            fixed_now(),
        )
        .unwrap()
    }

    #[test]
    fn empty_session_is_rejected() {
        let err = QuizSession::new(
            SessionId::new("s"),
            Category::OsmTrivia,
            Difficulty::Easy,
            Vec::new(),
            fixed_now(),
        )
        .unwrap_err();
        assert_eq!(err, SessionError::Empty);
    }

    #[test]
    fn correct_answer_scores_and_advances() {
        let s = session(3);
        let next = s.with_answer(&QuestionId::new("q1"), "right").unwrap();
        assert_eq!(next.score(), 1);
        assert_eq!(next.current_question_index(), 1);
        assert_eq!(next.answer_for(&QuestionId::new("q1")), Some("right"));
        assert_eq!(next.current_question().unwrap().id().as_str(), "q2");
    }

    #[test]
    fn wrong_answers_never_score() {
        let s = session(3);
        for wrong in ["wrong", "other", "RIGHT", ""] {
            let next = s.with_answer(&QuestionId::new("q1"), wrong).unwrap();
            assert_eq!(next.score(), 0);
            assert_eq!(next.current_question_index(), 1);
        }
    }

    #[test]
    fn answering_leaves_original_untouched() {
        let s = session(2);
        let _ = s.with_answer(&QuestionId::new("q1"), "right").unwrap();
        assert_eq!(s.score(), 0);
        assert_eq!(s.current_question_index(), 0);
        assert!(s.answers().is_empty());
    }

    #[test]
    fn unknown_question_is_an_error() {
        let s = session(2);
        let err = s.with_answer(&QuestionId::new("nope"), "right").unwrap_err();
        assert_eq!(
            err,
            SessionError::QuestionNotFound {
                id: QuestionId::new("nope")
            }
        );
    }

    #[test]
    fn answering_past_the_end_is_rejected() {
        let s = session(1)
            .with_answer(&QuestionId::new("q1"), "right")
            .unwrap();
        assert!(s.is_exhausted());
        assert_eq!(s.remaining(), 0);
        let err = s.with_answer(&QuestionId::new("q1"), "right").unwrap_err();
        assert_eq!(err, SessionError::Exhausted { total: 1 });
    }

    #[test]
    fn completed_session_rejects_answers() {
        let s = session(2).completed(fixed_now());
        let err = s.with_answer(&QuestionId::new("q1"), "right").unwrap_err();
        assert_eq!(err, SessionError::Completed);
    }

    #[test]
    fn cursor_tracks_answer_count() {
        let mut s = session(4);
        for (k, q) in ["q1", "q2", "q3"].iter().enumerate() {
            s = s.with_answer(&QuestionId::new(*q), "wrong").unwrap();
            assert_eq!(s.current_question_index(), k + 1);
            assert_eq!(s.answers().len(), k + 1);
            assert!(s.score() as usize <= s.current_question_index());
        }
    }
}
