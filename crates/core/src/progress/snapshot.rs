use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{TaskId, TaskRecord, UserLevel};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SnapshotError {
    #[error("basic task {0} cannot be locked")]
    LockedBasicTask(TaskId),
}

/// Read-only view of the registry.
///
/// Also the persistence view: serializing and restoring it through
/// `ProgressRegistry::from_snapshot` reproduces the same registry state.
/// `user_level` is informational; it is recomputed on restore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub records: BTreeMap<TaskId, TaskRecord>,
    pub user_level: UserLevel,
    #[serde(default)]
    pub full_features_override: bool,
}

impl ProgressSnapshot {
    #[must_use]
    pub fn record(&self, task_id: TaskId) -> Option<&TaskRecord> {
        self.records.get(&task_id)
    }

    /// Sum of best scores across all tasks.
    #[must_use]
    pub fn total_score(&self) -> u32 {
        self.records.values().map(|r| r.best_score.value()).sum()
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.records
            .values()
            .filter(|r| r.status.is_completed())
            .count()
    }
}
