use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::UserId;

/// XP needed per level.
pub const XP_PER_LEVEL: u64 = 100;

/// Level reached with `total_xp` lifetime experience (level 1 at 0 XP).
#[must_use]
pub fn level_for_total_xp(total_xp: u64) -> u32 {
    u32::try_from(total_xp / XP_PER_LEVEL)
        .unwrap_or(u32::MAX - 1)
        .saturating_add(1)
}

/// Player profile tracked by the user data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    pub level: u32,
    pub xp: u64,
    pub total_xp: u64,
    pub created_at: DateTime<Utc>,
}

/// Partial profile update; `None` fields are left alone.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xp: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_xp: Option<u64>,
}

impl ProfileUpdate {
    #[must_use]
    pub fn username(name: impl Into<String>) -> Self {
        Self {
            username: Some(name.into()),
            ..Self::default()
        }
    }

    /// Update that credits `xp` on top of `profile` and recomputes the level.
    #[must_use]
    pub fn xp_gain(profile: &UserProfile, xp: u64) -> Self {
        let total_xp = profile.total_xp.saturating_add(xp);
        Self {
            username: None,
            level: Some(level_for_total_xp(total_xp)),
            xp: Some(profile.xp.saturating_add(xp)),
            total_xp: Some(total_xp),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.level.is_none() && self.xp.is_none() && self.total_xp.is_none()
    }
}

impl UserProfile {
    #[must_use]
    pub fn apply(mut self, update: ProfileUpdate) -> Self {
        if let Some(username) = update.username {
            self.username = username;
        }
        if let Some(level) = update.level {
            self.level = level;
        }
        if let Some(xp) = update.xp {
            self.xp = xp;
        }
        if let Some(total_xp) = update.total_xp {
            self.total_xp = total_xp;
        }
        self
    }

    #[must_use]
    pub fn with_xp_added(self, xp: u64) -> Self {
        let update = ProfileUpdate::xp_gain(&self, xp);
        self.apply(update)
    }
}
