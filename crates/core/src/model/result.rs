use crate::model::QuizSession;

/// Experience-point payout for a completed session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Reward {
    pub base_xp: u32,
    pub bonus_xp: u32,
    pub total_xp: u32,
}

impl Reward {
    #[must_use]
    pub fn new(base_xp: u32, bonus_xp: u32) -> Self {
        Self {
            base_xp,
            bonus_xp,
            total_xp: base_xp.saturating_add(bonus_xp),
        }
    }
}

/// Terminal scoring snapshot of a session.
///
/// `session` is the completed copy and always carries `completed_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionResult {
    pub session: QuizSession,
    pub correct_answers: u32,
    pub total_questions: u32,
    /// Percentage in `0.0..=100.0`.
    pub accuracy: f64,
    pub elapsed_secs: u64,
    pub reward: Reward,
}

impl SessionResult {
    #[must_use]
    pub fn is_perfect(&self) -> bool {
        self.correct_answers == self.total_questions
    }

    /// Accuracy rounded to one decimal, for display and persistence.
    #[must_use]
    pub fn accuracy_rounded(&self) -> f64 {
        (self.accuracy * 10.0).round() / 10.0
    }
}
