//! Trivia minigame: session engine, sampling and the persisted play loop.

mod engine;
mod sampler;
mod workflow;

pub use engine::MinigameEngine;
pub use sampler::{QuestionSampler, RandomSampler, SeededSampler};
pub use workflow::{MinigameLoopService, PlayOutcome};
