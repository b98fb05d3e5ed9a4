use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use services::{
    AppConfig, AppServices, Clock, MinigameEngine, MinigameError, MinigameLoopService,
    SeededSampler,
};
use storage::memory::{SEED_USER_ID, SeedUserSource};
use storage::repository::{DataSources, MinigameDataSource, StorageError};
use storage::DataSourceMode;
use trivia_core::model::{Category, Difficulty, Question, SessionRecord, UserId};
use trivia_core::time::fixed_now;

/// Source whose question table is empty and whose history is unreachable.
struct EmptyRemote;

#[async_trait]
impl MinigameDataSource for EmptyRemote {
    async fn fetch_questions(
        &self,
        _category: Category,
        _difficulty: Difficulty,
        _limit: usize,
    ) -> Result<Vec<Question>, StorageError> {
        Ok(Vec::new())
    }

    async fn save_session(&self, _record: &SessionRecord) -> Result<(), StorageError> {
        Err(StorageError::Http { status: 503 })
    }

    async fn session_history(
        &self,
        _user_id: &UserId,
        _limit: u32,
    ) -> Result<Vec<SessionRecord>, StorageError> {
        Err(StorageError::Connection("offline".into()))
    }
}

#[tokio::test]
async fn seed_config_plays_a_full_session() {
    let config = AppConfig::default();
    let clock = Clock::fixed(fixed_now());
    let engine = MinigameEngine::standard()
        .with_clock(clock)
        .with_sampler(SeededSampler::new(9));
    let app = AppServices::with_engine(&config, clock, engine).await.unwrap();
    assert_eq!(app.mode(), DataSourceMode::Seed);

    let loop_svc = app.minigames();
    let mut session = loop_svc
        .start(Category::TagPuzzle, Difficulty::Medium)
        .await
        .unwrap();
    let questions = session.questions().to_vec();
    for (i, q) in questions.iter().enumerate() {
        let answer = if i < 3 { q.correct_answer() } else { "wrong" };
        session = loop_svc.answer(&session, q.id(), answer).unwrap();
    }
    let session = session.with_started_at(fixed_now() - Duration::seconds(45));

    let outcome = loop_svc.finish(app.user_id(), &session).await.unwrap();
    assert_eq!(outcome.result.accuracy, 60.0);
    assert_eq!(outcome.result.reward.total_xp, 60);
    assert_eq!(outcome.record.elapsed_secs, 45);
    assert_eq!(outcome.profile.as_ref().map(|p| p.total_xp), Some(1310));

    let history = loop_svc.history(app.user_id(), 10).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, *session.id());
}

#[tokio::test]
async fn registry_hands_out_the_same_sources() {
    let app = AppServices::from_config(&AppConfig::default(), Clock::fixed(fixed_now()))
        .await
        .unwrap();
    let registry = app.registry();
    let a = registry.sources(DataSourceMode::Seed).await.unwrap();
    let b = registry.sources(DataSourceMode::Seed).await.unwrap();
    assert!(a.same_instances(&b));
}

#[tokio::test]
async fn empty_source_falls_back_to_bank_and_errors_propagate() {
    let sources = DataSources::new(
        Arc::new(EmptyRemote),
        Arc::new(SeedUserSource::created_at(fixed_now())),
    );
    let loop_svc = MinigameLoopService::new(
        Arc::new(MinigameEngine::standard().with_clock(Clock::fixed(fixed_now()))),
        sources,
    );

    let session = loop_svc
        .start(Category::OsmTrivia, Difficulty::Hard)
        .await
        .unwrap();
    assert_eq!(session.total_questions(), 5);

    let err = loop_svc
        .finish(&UserId::new(SEED_USER_ID), &session)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        MinigameError::Storage(StorageError::Http { status: 503 })
    ));

    let err = loop_svc
        .history(&UserId::new(SEED_USER_ID), 10)
        .await
        .unwrap_err();
    assert!(matches!(err, MinigameError::Storage(StorageError::Connection(_))));
}

#[tokio::test]
async fn live_mode_without_credentials_fails_to_build() {
    let config = AppConfig {
        datasource: "live".into(),
        ..AppConfig::default()
    };
    let Err(err) = AppServices::from_config(&config, Clock::fixed(fixed_now())).await else {
        panic!("live mode should need credentials");
    };
    assert!(matches!(
        err,
        services::AppServicesError::Storage(StorageError::NotConfigured("supabase_url"))
    ));
}
