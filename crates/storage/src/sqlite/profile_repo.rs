use async_trait::async_trait;
use trivia_core::model::{ProfileUpdate, UserId, UserProfile};

use super::SqliteRepository;
use super::mapping::{db, map_profile_row, u64_to_i64};
use trivia_core::model::XP_PER_LEVEL;
use crate::repository::{StorageError, UserDataSource};

impl SqliteRepository {
    /// Insert `profile` unless a profile with the same id already exists.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the insert fails.
    pub async fn ensure_profile(&self, profile: &UserProfile) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO user_profiles (id, username, level, xp, total_xp, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO NOTHING
            ",
        )
        .bind(profile.id.as_str())
        .bind(&profile.username)
        .bind(i64::from(profile.level))
        .bind(u64_to_i64("xp", profile.xp)?)
        .bind(u64_to_i64("total_xp", profile.total_xp)?)
        .bind(profile.created_at)
        .execute(&self.pool)
        .await
        .map_err(db)?;
        Ok(())
    }
}

#[async_trait]
impl UserDataSource for SqliteRepository {
    async fn get_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, username, level, xp, total_xp, created_at
            FROM user_profiles
            WHERE id = ?1
            ",
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db)?;

        row.as_ref().map(map_profile_row).transpose()
    }

    async fn update_profile(
        &self,
        user_id: &UserId,
        update: ProfileUpdate,
    ) -> Result<UserProfile, StorageError> {
        let current = self
            .get_profile(user_id)
            .await?
            .ok_or(StorageError::NotFound)?;
        if update.is_empty() {
            return Ok(current);
        }
        let next = current.apply(update);

        let result = sqlx::query(
            r"
            UPDATE user_profiles
            SET username = ?2, level = ?3, xp = ?4, total_xp = ?5
            WHERE id = ?1
            ",
        )
        .bind(user_id.as_str())
        .bind(&next.username)
        .bind(i64::from(next.level))
        .bind(u64_to_i64("xp", next.xp)?)
        .bind(u64_to_i64("total_xp", next.total_xp)?)
        .execute(&self.pool)
        .await
        .map_err(db)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(next)
    }

    /// Credits XP in a single statement so concurrent sessions all count.
    async fn add_xp(&self, user_id: &UserId, xp: u64) -> Result<UserProfile, StorageError> {
        let row = sqlx::query(
            r"
            UPDATE user_profiles
            SET xp = xp + ?2,
                total_xp = total_xp + ?2,
                level = (total_xp + ?2) / ?3 + 1
            WHERE id = ?1
            RETURNING id, username, level, xp, total_xp, created_at
            ",
        )
        .bind(user_id.as_str())
        .bind(u64_to_i64("xp", xp)?)
        .bind(u64_to_i64("xp_per_level", XP_PER_LEVEL)?)
        .fetch_optional(&self.pool)
        .await
        .map_err(db)?;

        row.as_ref()
            .map(map_profile_row)
            .transpose()?
            .ok_or(StorageError::NotFound)
    }
}
