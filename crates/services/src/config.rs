//! Layered application configuration.
//!
//! Sources, highest priority last:
//! 1. built-in defaults
//! 2. `trivia.toml` in the working directory, if present
//! 3. `TRIVIA_*` environment variables (after `.env` is loaded)

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use storage::factory::{BackendSettings, DataSourceMode};
use storage::live::LiveConfig;
use storage::memory::SEED_USER_ID;
use trivia_core::model::UserId;

use crate::error::ConfigError;
use crate::features::FeatureFlags;

pub const CONFIG_FILE: &str = "trivia.toml";
pub const ENV_PREFIX: &str = "TRIVIA_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// `seed`, `mock`, `live` or `local`.
    pub datasource: String,
    /// `*` or a comma-separated list of feature names.
    pub enabled_features: String,
    pub supabase_url: String,
    pub supabase_key: String,
    pub database_url: String,
    /// Player whose profile and history the app uses.
    pub user_id: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            datasource: DataSourceMode::Seed.as_str().into(),
            enabled_features: "*".into(),
            supabase_url: String::new(),
            supabase_key: String::new(),
            database_url: "sqlite:trivia.sqlite3".into(),
            user_id: SEED_USER_ID.into(),
        }
    }
}

impl AppConfig {
    /// Load from defaults, `trivia.toml` and the environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self::figment().extract()?)
    }

    /// Same as [`AppConfig::load`], but reads `.env` first if there is one.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source cannot be parsed.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                log::warn!("could not read .env: {e}");
            }
        }
        Self::load()
    }

    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if Path::new(CONFIG_FILE).exists() {
            figment = figment.merge(Toml::file(CONFIG_FILE));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    #[must_use]
    pub fn mode(&self) -> DataSourceMode {
        DataSourceMode::parse_or_default(&self.datasource)
    }

    #[must_use]
    pub fn features(&self) -> FeatureFlags {
        FeatureFlags::from_list(&self.enabled_features)
    }

    #[must_use]
    pub fn backend_settings(&self) -> BackendSettings {
        BackendSettings {
            live: LiveConfig::new(&self.supabase_url, &self.supabase_key),
            database_url: self.database_url.clone(),
        }
    }

    /// The configured player, or the seed player if the value is blank.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
            .parse()
            .unwrap_or_else(|_| UserId::new(SEED_USER_ID))
    }
}
