//! Shared error types for the services crate.

use std::path::PathBuf;

use thiserror::Error;

use mastery_core::model::TaskResultError;
use mastery_core::progress::{SnapshotError, TaskLocked};
use mastery_core::session::InvalidAttempt;
use mastery_core::settings::SettingsError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressServiceError {
    #[error(transparent)]
    TaskLocked(#[from] TaskLocked),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("invalid progress export: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors emitted by `ExerciseLoopService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExerciseError {
    #[error(transparent)]
    TaskLocked(#[from] TaskLocked),
    #[error(transparent)]
    InvalidAttempt(#[from] InvalidAttempt),
    #[error("exercise already finished")]
    AlreadyFinished,
    #[error("no question was answered")]
    NothingAnswered,
    #[error(transparent)]
    Result(#[from] TaskResultError),
    #[error(transparent)]
    Progress(ProgressServiceError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<ProgressServiceError> for ExerciseError {
    fn from(err: ProgressServiceError) -> Self {
        match err {
            ProgressServiceError::TaskLocked(locked) => ExerciseError::TaskLocked(locked),
            other => ExerciseError::Progress(other),
        }
    }
}

/// Errors emitted while reading configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("invalid {var} value: {raw}")]
    InvalidEnv { var: &'static str, raw: String },
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Progress(#[from] ProgressServiceError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
