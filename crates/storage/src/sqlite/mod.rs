use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use thiserror::Error;
use trivia_core::bank::QuestionBank;
use trivia_core::model::{UserId, UserProfile};

use crate::memory::SEED_USER_ID;
use crate::repository::{DataSources, MinigameDataSource, StorageError, UserDataSource};

mod mapping;
mod migrate;
mod profile_repo;
mod minigame_repo;

#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SqliteInitError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl SqliteRepository {
    /// Connect to `SQLite` using the given URL, creating the database file if
    /// it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if the connection cannot be established or
    /// the connection pragmas fail.
    pub async fn connect(database_url: &str) -> Result<Self, SqliteInitError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    sqlx::query("PRAGMA journal_mode = WAL;")
                        .execute(&mut *conn)
                        .await?;
                    sqlx::query("PRAGMA busy_timeout = 5000;")
                        .execute(&mut *conn)
                        .await?;
                    Ok(())
                })
            })
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create tables if they do not exist.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if migration queries fail.
    pub async fn migrate(&self) -> Result<(), SqliteInitError> {
        migrate::run_migrations(&self.pool).await
    }
}

impl DataSources {
    /// Local, file-backed data sources.
    ///
    /// Runs migrations, loads the bundled question bank and creates the seed
    /// player if the database is new.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if connection, migrations or seeding fail.
    pub async fn sqlite(
        database_url: &str,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<Self, SqliteInitError> {
        let repo = SqliteRepository::connect(database_url).await?;
        repo.migrate().await?;

        let inserted = repo.seed_questions(&QuestionBank::standard()).await?;
        if inserted > 0 {
            log::info!("local: seeded {inserted} bundled questions");
        }
        repo.ensure_profile(&UserProfile {
            id: UserId::new(SEED_USER_ID),
            username: "SeedPlayer".into(),
            level: 5,
            xp: 250,
            total_xp: 1250,
            created_at: now,
        })
        .await?;

        let minigames: Arc<dyn MinigameDataSource> = Arc::new(repo.clone());
        let users: Arc<dyn UserDataSource> = Arc::new(repo);
        Ok(Self { minigames, users })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SqliteRepository>();
    }
}
