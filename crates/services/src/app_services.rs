use std::sync::Arc;

use storage::factory::{DataSourceMode, DataSourceRegistry};
use trivia_core::model::UserId;

use crate::Clock;
use crate::config::AppConfig;
use crate::error::AppServicesError;
use crate::features::FeatureFlags;
use crate::minigame::{MinigameEngine, MinigameLoopService};

/// Assembles app-facing services for the configured data source.
#[derive(Clone)]
pub struct AppServices {
    mode: DataSourceMode,
    user_id: UserId,
    features: FeatureFlags,
    registry: Arc<DataSourceRegistry>,
    minigames: Arc<MinigameLoopService>,
}

impl AppServices {
    /// Build services from a loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the selected data source cannot be
    /// initialized.
    pub async fn from_config(config: &AppConfig, clock: Clock) -> Result<Self, AppServicesError> {
        let registry = Arc::new(
            DataSourceRegistry::new(config.backend_settings()).with_clock(clock),
        );
        let engine = Arc::new(MinigameEngine::standard().with_clock(clock));
        Self::build(config, registry, engine).await
    }

    /// Like [`AppServices::from_config`] with a caller-supplied engine.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the selected data source cannot be
    /// initialized.
    pub async fn with_engine(
        config: &AppConfig,
        clock: Clock,
        engine: MinigameEngine,
    ) -> Result<Self, AppServicesError> {
        let registry = Arc::new(
            DataSourceRegistry::new(config.backend_settings()).with_clock(clock),
        );
        Self::build(config, registry, Arc::new(engine)).await
    }

    async fn build(
        config: &AppConfig,
        registry: Arc<DataSourceRegistry>,
        engine: Arc<MinigameEngine>,
    ) -> Result<Self, AppServicesError> {
        let mode = config.mode();
        let features = config.features();
        let sources = registry.sources(mode).await?;
        log::info!(
            "services: {mode} data sources, features {:?}",
            features.enabled()
        );

        let minigames = Arc::new(
            MinigameLoopService::new(engine, sources).with_features(features.clone()),
        );

        Ok(Self {
            mode,
            user_id: config.user_id(),
            features,
            registry,
            minigames,
        })
    }

    #[must_use]
    pub fn mode(&self) -> DataSourceMode {
        self.mode
    }

    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    #[must_use]
    pub fn features(&self) -> &FeatureFlags {
        &self.features
    }

    #[must_use]
    pub fn registry(&self) -> Arc<DataSourceRegistry> {
        Arc::clone(&self.registry)
    }

    #[must_use]
    pub fn minigames(&self) -> Arc<MinigameLoopService> {
        Arc::clone(&self.minigames)
    }
}
