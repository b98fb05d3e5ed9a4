use chrono::Duration;
use std::sync::Arc;
use storage::repository::{DataSources, MinigameDataSource, StorageError, UserDataSource};
use storage::sqlite::SqliteRepository;
use trivia_core::bank::QuestionBank;
use trivia_core::model::{
    Category, Difficulty, ProfileUpdate, SessionId, SessionRecord, UserId, UserProfile,
};
use trivia_core::time::fixed_now;

fn record(id: &str, user: &str, minutes_ago: i64, xp: u32) -> SessionRecord {
    SessionRecord {
        id: SessionId::new(id),
        user_id: UserId::new(user),
        category: Category::TagPuzzle,
        difficulty: Difficulty::Hard,
        score: 4,
        total_questions: 5,
        accuracy: 80.0,
        elapsed_secs: 95,
        xp_earned: xp,
        completed_at: fixed_now() - Duration::minutes(minutes_ago),
    }
}

#[tokio::test]
async fn sqlite_serves_seeded_questions_by_category_and_difficulty() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_questions?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let bank = QuestionBank::standard();
    let inserted = repo.seed_questions(&bank).await.unwrap();
    assert_eq!(inserted, bank.len());
    assert_eq!(repo.seed_questions(&bank).await.unwrap(), 0);

    let questions = repo
        .fetch_questions(Category::OsmTrivia, Difficulty::Medium, 5)
        .await
        .unwrap();
    assert_eq!(questions.len(), 5);
    assert!(
        questions
            .iter()
            .all(|q| q.matches(Category::OsmTrivia, Difficulty::Medium))
    );
    for q in &questions {
        assert!(q.options().iter().any(|o| o == q.correct_answer()));
    }

    let few = repo
        .fetch_questions(Category::TagPuzzle, Difficulty::Easy, 2)
        .await
        .unwrap();
    assert_eq!(few.len(), 2);
}

#[tokio::test]
async fn sqlite_history_is_newest_first_and_per_user() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_history?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    repo.save_session(&record("old", "u1", 60, 10)).await.unwrap();
    repo.save_session(&record("new", "u1", 1, 20)).await.unwrap();
    repo.save_session(&record("mid", "u1", 30, 30)).await.unwrap();
    repo.save_session(&record("theirs", "u2", 0, 40)).await.unwrap();

    let history = repo.session_history(&UserId::new("u1"), 10).await.unwrap();
    let ids: Vec<_> = history.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["new", "mid", "old"]);
    assert_eq!(history[0], record("new", "u1", 1, 20));

    let limited = repo.session_history(&UserId::new("u1"), 1).await.unwrap();
    assert_eq!(limited.len(), 1);

    let err = repo
        .save_session(&record("new", "u1", 1, 20))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Conflict));
}

#[tokio::test]
async fn sqlite_profiles_track_xp_and_level() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_profiles?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let user = UserId::new("player-7");
    assert!(repo.get_profile(&user).await.unwrap().is_none());
    assert!(matches!(
        repo.add_xp(&user, 10).await.unwrap_err(),
        StorageError::NotFound
    ));

    let profile = UserProfile {
        id: user.clone(),
        username: "Seven".into(),
        level: 5,
        xp: 250,
        total_xp: 1250,
        created_at: fixed_now(),
    };
    repo.ensure_profile(&profile).await.unwrap();
    // Second insert keeps the existing row.
    repo.ensure_profile(&UserProfile {
        username: "Other".into(),
        ..profile.clone()
    })
    .await
    .unwrap();

    let updated = repo.add_xp(&user, 100).await.unwrap();
    assert_eq!(updated.xp, 350);
    assert_eq!(updated.total_xp, 1350);
    assert_eq!(updated.level, 14);
    assert_eq!(updated.username, "Seven");

    let renamed = repo
        .update_profile(&user, ProfileUpdate::username("Renamed"))
        .await
        .unwrap();
    assert_eq!(renamed.username, "Renamed");
    assert_eq!(repo.get_profile(&user).await.unwrap(), Some(renamed));
}

#[tokio::test]
async fn local_data_sources_start_with_bank_and_seed_player() {
    let sources = DataSources::sqlite(
        "sqlite:file:memdb_local_sources?mode=memory&cache=shared",
        fixed_now(),
    )
    .await
    .expect("init");

    let profile = sources
        .users
        .get_profile(&UserId::new(storage::memory::SEED_USER_ID))
        .await
        .unwrap()
        .expect("seed player");
    assert_eq!(profile.username, "SeedPlayer");
    assert_eq!(profile.level, 5);

    let questions = sources
        .minigames
        .fetch_questions(Category::TagPuzzle, Difficulty::Hard, 5)
        .await
        .unwrap();
    assert_eq!(questions.len(), 5);
}

#[tokio::test]
async fn sqlite_creates_a_missing_database_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("fresh.sqlite3");
    assert!(!path.exists());

    let url = format!("sqlite://{}", path.display());
    let sources = DataSources::sqlite(&url, fixed_now()).await.expect("init");
    assert!(path.exists());

    let questions = sources
        .minigames
        .fetch_questions(Category::OsmTrivia, Difficulty::Easy, 5)
        .await
        .unwrap();
    assert_eq!(questions.len(), 5);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn sqlite_concurrent_xp_credits_all_land() {
    let dir = tempfile::tempdir().expect("tempdir");
    let url = format!("sqlite://{}", dir.path().join("xp.sqlite3").display());
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");

    let user = UserId::new("racer");
    repo.ensure_profile(&UserProfile {
        id: user.clone(),
        username: "Racer".into(),
        level: 1,
        xp: 0,
        total_xp: 0,
        created_at: fixed_now(),
    })
    .await
    .unwrap();

    let repo = Arc::new(repo);
    let tasks: Vec<_> = (0..50)
        .map(|_| {
            let repo = Arc::clone(&repo);
            let user = user.clone();
            tokio::spawn(async move { repo.add_xp(&user, 10).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let profile = repo.get_profile(&user).await.unwrap().expect("profile");
    assert_eq!(profile.xp, 500);
    assert_eq!(profile.total_xp, 500);
    assert_eq!(profile.level, 6);
}
