#![forbid(unsafe_code)]

pub mod app_services;
pub mod config;
pub mod error;
pub mod features;
pub mod minigame;

pub use trivia_core::Clock;

pub use app_services::AppServices;
pub use config::AppConfig;
pub use error::{AppServicesError, ConfigError, MinigameError};
pub use features::{FeatureFlag, FeatureFlags, UnknownFeatureError};
pub use minigame::{
    MinigameEngine, MinigameLoopService, PlayOutcome, QuestionSampler, RandomSampler,
    SeededSampler,
};
