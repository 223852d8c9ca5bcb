use std::sync::Arc;

use mastery_core::ProgressionSettings;
use storage::repository::Storage;
use tracing::info;

use crate::config::ServicesConfig;
use crate::error::AppServicesError;
use crate::exercise::ExerciseLoopService;
use crate::progress_service::ProgressService;
use crate::Clock;

/// Application root: owns the progress registry and the exercise loop.
#[derive(Clone)]
pub struct AppServices {
    progress: Arc<ProgressService>,
    exercises: Arc<ExerciseLoopService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or progress
    /// restoration fails.
    pub async fn new_sqlite(config: &ServicesConfig, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(&config.db_url).await?;
        info!(db_url = %config.db_url, "sqlite storage ready");
        Self::from_storage(storage, config.settings, clock).await
    }

    /// Build services from environment configuration.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if configuration is invalid or storage
    /// initialization fails.
    pub async fn from_env(clock: Clock) -> Result<Self, AppServicesError> {
        let config = ServicesConfig::from_env()?;
        Self::new_sqlite(&config, clock).await
    }

    /// Build services over in-memory storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if progress restoration fails.
    pub async fn in_memory(
        settings: ProgressionSettings,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        Self::from_storage(Storage::in_memory(), settings, clock).await
    }

    async fn from_storage(
        storage: Storage,
        settings: ProgressionSettings,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let progress = Arc::new(ProgressService::load(settings, Arc::clone(&storage.progress)).await?);
        let exercises = Arc::new(ExerciseLoopService::new(
            clock,
            Arc::clone(&progress),
            Arc::clone(&storage.results),
        ));
        Ok(Self {
            progress,
            exercises,
        })
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn exercises(&self) -> Arc<ExerciseLoopService> {
        Arc::clone(&self.exercises)
    }
}
