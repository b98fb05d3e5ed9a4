//! Mode selection and the per-mode adapter cache.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use trivia_core::Clock;

use crate::live::{LiveConfig, LiveMinigameSource, LiveUserSource};
use crate::memory::{
    MockMinigameSource, MockUserSource, SeedMinigameSource, SeedUserSource, lock,
};
use crate::repository::{DataSources, StorageError};

/// Where minigame questions, sessions and profiles come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DataSourceMode {
    /// Bundled question bank, in-memory sessions and profile.
    #[default]
    Seed,
    /// Canned questions padded with placeholders.
    Mock,
    /// Remote PostgREST backend.
    Live,
    /// `SQLite` database on disk.
    Local,
}

impl DataSourceMode {
    pub const ALL: [Self; 4] = [Self::Seed, Self::Mock, Self::Live, Self::Local];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Seed => "seed",
            Self::Mock => "mock",
            Self::Live => "live",
            Self::Local => "local",
        }
    }

    /// Parse a configured mode, falling back to `Seed` on unknown input.
    #[must_use]
    pub fn parse_or_default(raw: &str) -> Self {
        raw.parse().unwrap_or_else(|e| {
            log::warn!("{e}; using {}", Self::Seed);
            Self::Seed
        })
    }
}

impl fmt::Display for DataSourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownModeError(pub String);

impl fmt::Display for UnknownModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown data source mode: {:?}", self.0)
    }
}

impl std::error::Error for UnknownModeError {}

impl FromStr for DataSourceMode {
    type Err = UnknownModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "seed" => Ok(Self::Seed),
            "mock" => Ok(Self::Mock),
            "live" => Ok(Self::Live),
            "local" => Ok(Self::Local),
            _ => Err(UnknownModeError(s.to_owned())),
        }
    }
}

/// Connection settings for the backends that need them.
#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub live: LiveConfig,
    pub database_url: String,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            live: LiveConfig::new("", ""),
            database_url: "sqlite:trivia.sqlite3".into(),
        }
    }
}

/// Builds adapters on first use of a mode and hands out the same instances
/// afterwards until `clear` is called.
pub struct DataSourceRegistry {
    settings: BackendSettings,
    clock: Clock,
    cache: Mutex<HashMap<DataSourceMode, DataSources>>,
}

impl DataSourceRegistry {
    #[must_use]
    pub fn new(settings: BackendSettings) -> Self {
        Self {
            settings,
            clock: Clock::default_clock(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn settings(&self) -> &BackendSettings {
        &self.settings
    }

    /// Adapters for `mode`, created on first request.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotConfigured` for `Live` without a URL or key,
    /// and `StorageError::Connection` if the local database cannot be opened.
    pub async fn sources(&self, mode: DataSourceMode) -> Result<DataSources, StorageError> {
        let cached = lock(&self.cache)?.get(&mode).cloned();
        if let Some(cached) = cached {
            return Ok(cached);
        }

        let built = self.build(mode).await?;
        log::info!("data sources: initialized {mode} adapters");

        // Another caller may have raced us; keep whichever got in first.
        let mut cache = lock(&self.cache)?;
        Ok(cache.entry(mode).or_insert(built).clone())
    }

    /// Drop every cached adapter so the next request builds fresh ones.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the cache lock is poisoned.
    pub fn clear(&self) -> Result<(), StorageError> {
        lock(&self.cache)?.clear();
        log::debug!("data sources: cache cleared");
        Ok(())
    }

    async fn build(&self, mode: DataSourceMode) -> Result<DataSources, StorageError> {
        let sources = match mode {
            DataSourceMode::Seed => DataSources::new(
                Arc::new(SeedMinigameSource::new()),
                Arc::new(SeedUserSource::created_at(self.clock.now())),
            ),
            DataSourceMode::Mock => DataSources::new(
                Arc::new(MockMinigameSource::new()),
                Arc::new(MockUserSource::created_at(self.clock.now())),
            ),
            DataSourceMode::Live => DataSources::new(
                Arc::new(LiveMinigameSource::new(self.settings.live.clone())?),
                Arc::new(LiveUserSource::new(self.settings.live.clone())?),
            ),
            DataSourceMode::Local => {
                DataSources::sqlite(&self.settings.database_url, self.clock.now())
                    .await
                    .map_err(|e| StorageError::Connection(e.to_string()))?
            }
        };
        Ok(sources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trivia_core::time::fixed_clock;

    fn registry() -> DataSourceRegistry {
        DataSourceRegistry::new(BackendSettings::default()).with_clock(fixed_clock())
    }

    #[test]
    fn modes_parse_case_insensitively() {
        assert_eq!("LIVE".parse::<DataSourceMode>(), Ok(DataSourceMode::Live));
        assert_eq!(" mock ".parse::<DataSourceMode>(), Ok(DataSourceMode::Mock));
        assert!("remote".parse::<DataSourceMode>().is_err());
        assert_eq!(DataSourceMode::parse_or_default("nonsense"), DataSourceMode::Seed);
        for mode in DataSourceMode::ALL {
            assert_eq!(mode.as_str().parse::<DataSourceMode>(), Ok(mode));
        }
    }

    #[tokio::test]
    async fn repeated_requests_share_instances() {
        let registry = registry();
        let a = registry.sources(DataSourceMode::Seed).await.unwrap();
        let b = registry.sources(DataSourceMode::Seed).await.unwrap();
        assert!(a.same_instances(&b));
    }

    #[tokio::test]
    async fn different_modes_get_different_instances() {
        let registry = registry();
        let seed = registry.sources(DataSourceMode::Seed).await.unwrap();
        let mock = registry.sources(DataSourceMode::Mock).await.unwrap();
        assert!(!seed.same_instances(&mock));
    }

    #[tokio::test]
    async fn clear_forces_new_instances() {
        let registry = registry();
        let before = registry.sources(DataSourceMode::Mock).await.unwrap();
        registry.clear().unwrap();
        let after = registry.sources(DataSourceMode::Mock).await.unwrap();
        assert!(!before.same_instances(&after));
    }

    #[tokio::test]
    async fn live_without_credentials_is_not_configured() {
        let err = registry()
            .sources(DataSourceMode::Live)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, StorageError::NotConfigured("supabase_url")));
    }
}
