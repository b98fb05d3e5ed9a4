use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question id cannot be empty")]
    EmptyId,

    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("question must have at least one option")]
    NoOptions,

    #[error("correct answer {answer:?} is not one of the options")]
    AnswerNotInOptions { answer: String },

    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),
}

//
// ─── CATEGORY / DIFFICULTY ─────────────────────────────────────────────────────
//

/// Minigame a question belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    /// General OpenStreetMap knowledge.
    OsmTrivia,
    /// Match a real-world feature to its OSM tag.
    TagPuzzle,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::OsmTrivia, Category::TagPuzzle];

    /// Wire name used by data sources.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::OsmTrivia => "OSM_TRIVIA",
            Category::TagPuzzle => "TAG_PUZZLE",
        }
    }
}

/// Question difficulty. Ordered from easiest to hardest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Medium => "MEDIUM",
            Difficulty::Hard => "HARD",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts `OSM_TRIVIA`, `osm_trivia` and `osm-trivia`.
fn normalize_key(s: &str) -> String {
    s.trim().to_ascii_uppercase().replace('-', "_")
}

impl FromStr for Category {
    type Err = QuestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_key(s).as_str() {
            "OSM_TRIVIA" => Ok(Category::OsmTrivia),
            "TAG_PUZZLE" => Ok(Category::TagPuzzle),
            _ => Err(QuestionError::UnknownCategory(s.to_owned())),
        }
    }
}

impl FromStr for Difficulty {
    type Err = QuestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_key(s).as_str() {
            "EASY" => Ok(Difficulty::Easy),
            "MEDIUM" => Ok(Difficulty::Medium),
            "HARD" => Ok(Difficulty::Hard),
            _ => Err(QuestionError::UnknownDifficulty(s.to_owned())),
        }
    }
}

//
// ─── QUESTION TYPES ────────────────────────────────────────────────────────────
//

/// Unvalidated question as it arrives from the bank or a data source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    pub id: String,
    pub category: Category,
    pub difficulty: Difficulty,
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub osm_tag: Option<String>,
}

impl QuestionDraft {
    /// Checks the draft and freezes it into a `Question`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the id or prompt is blank, there are no
    /// options, or the correct answer is not among the options.
    pub fn validate(self) -> Result<Question, QuestionError> {
        if self.id.trim().is_empty() {
            return Err(QuestionError::EmptyId);
        }
        if self.prompt.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        if self.options.is_empty() {
            return Err(QuestionError::NoOptions);
        }
        if !self.options.iter().any(|opt| *opt == self.correct_answer) {
            return Err(QuestionError::AnswerNotInOptions {
                answer: self.correct_answer,
            });
        }

        Ok(Question {
            id: QuestionId::new(self.id),
            category: self.category,
            difficulty: self.difficulty,
            prompt: self.prompt,
            options: self.options,
            correct_answer: self.correct_answer,
            osm_tag: self.osm_tag.filter(|tag| !tag.trim().is_empty()),
        })
    }
}

/// A validated, immutable quiz question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    category: Category,
    difficulty: Difficulty,
    prompt: String,
    options: Vec<String>,
    correct_answer: String,
    osm_tag: Option<String>,
}

impl Question {
    #[must_use]
    pub fn id(&self) -> &QuestionId {
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
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn osm_tag(&self) -> Option<&str> {
        self.osm_tag.as_deref()
    }

    /// Exact, case-sensitive comparison with the correct answer.
    #[must_use]
    pub fn is_correct(&self, answer: &str) -> bool {
        self.correct_answer == answer
    }

    #[must_use]
    pub fn matches(&self, category: Category, difficulty: Difficulty) -> bool {
        self.category == category && self.difficulty == difficulty
    }

    /// Back to a draft, for adapters that serialize questions.
    #[must_use]
    pub fn to_draft(&self) -> QuestionDraft {
        QuestionDraft {
            id: self.id.as_str().to_owned(),
            category: self.category,
            difficulty: self.difficulty,
            prompt: self.prompt.clone(),
            options: self.options.clone(),
            correct_answer: self.correct_answer.clone(),
            osm_tag: self.osm_tag.clone(),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> QuestionDraft {
        QuestionDraft {
            id: "q-1".into(),
            category: Category::OsmTrivia,
            difficulty: Difficulty::Easy,
            prompt: "What does amenity=cafe describe?".into(),
            options: vec!["Cafe".into(), "Bar".into()],
            correct_answer: "Cafe".into(),
            osm_tag: Some("amenity=cafe".into()),
        }
    }

    #[test]
    fn valid_draft_becomes_question() {
        let q = draft().validate().unwrap();
        assert_eq!(q.id().as_str(), "q-1");
        assert_eq!(q.osm_tag(), Some("amenity=cafe"));
        assert!(q.matches(Category::OsmTrivia, Difficulty::Easy));
    }

    #[test]
    fn correct_answer_must_be_an_option() {
        let mut d = draft();
        d.correct_answer = "Restaurant".into();
        let err = d.validate().unwrap_err();
        assert!(matches!(err, QuestionError::AnswerNotInOptions { .. }));
    }

    #[test]
    fn empty_options_are_rejected() {
        let mut d = draft();
        d.options.clear();
        assert_eq!(d.validate().unwrap_err(), QuestionError::NoOptions);
    }

    #[test]
    fn blank_prompt_is_rejected() {
        let mut d = draft();
        d.prompt = "  ".into();
        assert_eq!(d.validate().unwrap_err(), QuestionError::EmptyPrompt);
    }

    #[test]
    fn correctness_is_case_sensitive() {
        let q = draft().validate().unwrap();
        assert!(q.is_correct("Cafe"));
        assert!(!q.is_correct("cafe"));
        assert!(!q.is_correct("Cafe "));
    }

    #[test]
    fn category_parses_wire_and_cli_forms() {
        assert_eq!("OSM_TRIVIA".parse::<Category>().unwrap(), Category::OsmTrivia);
        assert_eq!("tag-puzzle".parse::<Category>().unwrap(), Category::TagPuzzle);
        assert!("trivia".parse::<Category>().is_err());
    }

    #[test]
    fn difficulty_parses_and_orders() {
        assert_eq!("medium".parse::<Difficulty>().unwrap(), Difficulty::Medium);
        assert!(Difficulty::Easy < Difficulty::Medium);
        assert!(Difficulty::Medium < Difficulty::Hard);
    }

    #[test]
    fn enums_serialize_with_wire_names() {
        assert_eq!(
            serde_json::to_string(&Category::TagPuzzle).unwrap(),
            "\"TAG_PUZZLE\""
        );
        assert_eq!(serde_json::to_string(&Difficulty::Hard).unwrap(), "\"HARD\"");
    }
}
