//! Reward rules for minigame sessions.
//!
//! Rewards are a pure function of difficulty, correct count, question count
//! and elapsed time, so the whole table lives here rather than in services.

use crate::model::{Difficulty, Reward};

/// Per-difficulty XP rate and speed-bonus threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DifficultyRule {
    pub xp_per_correct: u32,
    /// A perfect run strictly under this many seconds earns the speed bonus.
    pub speed_threshold_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardRules {
    easy: DifficultyRule,
    medium: DifficultyRule,
    hard: DifficultyRule,
    perfect_bonus: u32,
    speed_bonus: u32,
    questions_per_session: usize,
}

impl Default for RewardRules {
    fn default() -> Self {
        Self::standard()
    }
}

impl RewardRules {
    /// The rule table shipped with the game.
    ///
    /// - EASY: 10 XP per correct answer, speed bonus under 60s
    /// - MEDIUM: 20 XP, under 90s
    /// - HARD: 30 XP, under 120s
    /// - 50 XP for a perfect score, plus 25 XP if it was also fast
    /// - 5 questions per session
    #[must_use]
    pub fn standard() -> Self {
        Self {
            easy: DifficultyRule {
                xp_per_correct: 10,
                speed_threshold_secs: 60,
            },
            medium: DifficultyRule {
                xp_per_correct: 20,
                speed_threshold_secs: 90,
            },
            hard: DifficultyRule {
                xp_per_correct: 30,
                speed_threshold_secs: 120,
            },
            perfect_bonus: 50,
            speed_bonus: 25,
            questions_per_session: 5,
        }
    }

    #[must_use]
    pub fn with_questions_per_session(mut self, count: usize) -> Self {
        self.questions_per_session = count.max(1);
        self
    }

    #[must_use]
    pub fn rule(&self, difficulty: Difficulty) -> DifficultyRule {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
        }
    }

    #[must_use]
    pub fn perfect_bonus(&self) -> u32 {
        self.perfect_bonus
    }

    #[must_use]
    pub fn speed_bonus(&self) -> u32 {
        self.speed_bonus
    }

    #[must_use]
    pub fn questions_per_session(&self) -> usize {
        self.questions_per_session
    }

    /// Compute the payout for a finished session.
    #[must_use]
    pub fn reward(
        &self,
        difficulty: Difficulty,
        correct_answers: u32,
        total_questions: u32,
        elapsed_secs: u64,
    ) -> Reward {
        let rule = self.rule(difficulty);
        let base_xp = correct_answers.saturating_mul(rule.xp_per_correct);

        let mut bonus_xp = 0;
        let is_perfect = correct_answers == total_questions;
        if is_perfect {
            bonus_xp += self.perfect_bonus;
            if elapsed_secs < rule.speed_threshold_secs {
                bonus_xp += self.speed_bonus;
            }
        }

        Reward::new(base_xp, bonus_xp)
    }
}

/// `100 * correct / total`, or 0 for an empty session.
#[must_use]
pub fn accuracy(correct_answers: u32, total_questions: u32) -> f64 {
    if total_questions == 0 {
        return 0.0;
    }
    f64::from(correct_answers) * 100.0 / f64::from(total_questions)
}
