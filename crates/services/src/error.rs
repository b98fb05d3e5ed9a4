//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use trivia_core::model::{Category, Difficulty, QuestionId, SessionError};

use crate::features::FeatureFlag;

/// Errors emitted by the minigame engine and play workflow.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MinigameError {
    #[error("no {category} questions available at {difficulty} difficulty")]
    NoQuestions {
        category: Category,
        difficulty: Difficulty,
    },
    #[error("session already completed")]
    AlreadyCompleted,
    #[error("question {id} is not the current question")]
    NotCurrentQuestion { id: QuestionId },
    #[error("feature disabled: {0}")]
    FeatureDisabled(FeatureFlag),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while loading `AppConfig`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        Self::Figment(Box::new(e))
    }
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
