use thiserror::Error;

use crate::model::{
    CategoryError, ParseStatusError, ParseTaskIdError, ParseUserLevelError, ScoreError,
    TaskResultError,
};
use crate::progress::{SnapshotError, TaskLocked};
use crate::session::InvalidAttempt;
use crate::settings::SettingsError;

/// Any error the core crate can produce.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    InvalidAttempt(#[from] InvalidAttempt),
    #[error(transparent)]
    TaskLocked(#[from] TaskLocked),
    #[error(transparent)]
    UnknownTaskId(#[from] ParseTaskIdError),
    #[error(transparent)]
    Status(#[from] ParseStatusError),
    #[error(transparent)]
    UserLevel(#[from] ParseUserLevelError),
    #[error(transparent)]
    Score(#[from] ScoreError),
    #[error(transparent)]
    Category(#[from] CategoryError),
    #[error(transparent)]
    TaskResult(#[from] TaskResultError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
}
