//! Process-wide task progression: unlock status, best scores, level.

mod snapshot;
mod unlock;

use thiserror::Error;
use tracing::{debug, info};

use crate::model::{Score, TaskId, TaskRecord, TaskStatus, UserLevel};
use crate::settings::{LevelThresholds, ProgressionSettings};

pub use snapshot::{ProgressSnapshot, SnapshotError};
pub use unlock::{StatusChange, UnlockPolicy, derive_level};

/// One record per task, indexed by `TaskId::index`.
pub type RecordTable = [TaskRecord; TaskId::COUNT];

/// Selecting a task whose tier gate is still closed.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("task {task_id} is locked")]
pub struct TaskLocked {
    pub task_id: TaskId,
}

//
// ─── REGISTRY ──────────────────────────────────────────────────────────────────
//

/// Tracks unlock status and best score for every task.
///
/// Constructed explicitly by the application root and passed by reference;
/// there is no global instance. The level is never stored, it is derived
/// from the records on every read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressRegistry {
    records: RecordTable,
    full_features_override: bool,
    policy: UnlockPolicy,
    levels: LevelThresholds,
}

impl Default for ProgressRegistry {
    fn default() -> Self {
        Self::new(ProgressionSettings::default())
    }
}

impl ProgressRegistry {
    /// Fresh registry: basic tasks unlocked, advanced tasks locked unless the
    /// threshold is already met (a zero threshold opens them immediately).
    #[must_use]
    pub fn new(settings: ProgressionSettings) -> Self {
        let mut registry = Self {
            records: TaskId::ALL.map(TaskRecord::initial),
            full_features_override: false,
            policy: UnlockPolicy::new(Score::saturating(settings.unlock_threshold)),
            levels: settings.levels,
        };
        registry.reevaluate();
        registry
    }

    /// Rebuild a registry from a persisted snapshot.
    ///
    /// Tasks missing from the snapshot start from their initial record. The
    /// unlock gate is re-applied, which leaves a snapshot taken from a
    /// registry unchanged.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError::LockedBasicTask` if a basic task is recorded as locked.
    pub fn from_snapshot(
        snapshot: &ProgressSnapshot,
        settings: ProgressionSettings,
    ) -> Result<Self, SnapshotError> {
        let mut registry = Self::new(settings);
        for (task_id, record) in &snapshot.records {
            if task_id.is_basic() && record.status.is_locked() {
                return Err(SnapshotError::LockedBasicTask(*task_id));
            }
            registry.records[task_id.index()] = *record;
        }
        registry.full_features_override = snapshot.full_features_override;
        let changes = registry.reevaluate();
        if !changes.is_empty() {
            debug!(?changes, "restored snapshot adjusted by unlock gate");
        }
        Ok(registry)
    }

    #[must_use]
    pub fn record(&self, task_id: TaskId) -> TaskRecord {
        self.records[task_id.index()]
    }

    #[must_use]
    pub fn status(&self, task_id: TaskId) -> TaskStatus {
        self.record(task_id).status
    }

    #[must_use]
    pub fn full_features_override(&self) -> bool {
        self.full_features_override
    }

    #[must_use]
    pub fn policy(&self) -> UnlockPolicy {
        self.policy
    }

    /// Record the final score of a finished task.
    ///
    /// Keeps the best score, marks the task completed, and re-applies the
    /// unlock gate. Returns the advanced-tier status changes this caused.
    pub fn report_task_result(&mut self, task_id: TaskId, final_score: Score) -> Vec<StatusChange> {
        let record = &mut self.records[task_id.index()];
        let previous = record.best_score;
        record.best_score = previous.max(final_score);
        record.status = TaskStatus::Completed;
        debug!(
            task = %task_id,
            score = %final_score,
            best = %record.best_score,
            "task result reported"
        );

        self.reevaluate()
    }

    /// Mark a task as being worked on.
    ///
    /// A completed task stays `Completed` while it is retried.
    ///
    /// # Errors
    ///
    /// Returns `TaskLocked` if the task is locked and the override is off.
    pub fn select_task(&mut self, task_id: TaskId) -> Result<(), TaskLocked> {
        let record = &mut self.records[task_id.index()];
        match record.status {
            TaskStatus::Locked if !self.full_features_override => {
                debug!(task = %task_id, "selection refused, task locked");
                Err(TaskLocked { task_id })
            }
            TaskStatus::Completed => Ok(()),
            _ => {
                record.status = TaskStatus::InProgress;
                Ok(())
            }
        }
    }

    /// Toggle the flag that bypasses the advanced-tier gate.
    ///
    /// Turning it off re-locks advanced tasks that were only open because of
    /// the override. Completed tasks keep their status.
    pub fn set_full_features_override(&mut self, enabled: bool) -> Vec<StatusChange> {
        if self.full_features_override != enabled {
            info!(enabled, "full features override toggled");
        }
        self.full_features_override = enabled;
        self.reevaluate()
    }

    #[must_use]
    pub fn user_level(&self) -> UserLevel {
        derive_level(&self.records, &self.levels)
    }

    #[must_use]
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            records: TaskId::ALL
                .into_iter()
                .map(|id| (id, self.record(id)))
                .collect(),
            user_level: self.user_level(),
            full_features_override: self.full_features_override,
        }
    }

    /// Blended progress in `0..=100`.
    ///
    /// Half comes from the share of completed tasks, half from the share of
    /// the maximum possible score. Rounded down.
    #[must_use]
    pub fn calculate_overall_progress(&self) -> u8 {
        let count = self.records.len() as u64;
        let completed = self
            .records
            .iter()
            .filter(|r| r.status.is_completed())
            .count() as u64;
        let total: u64 = self
            .records
            .iter()
            .map(|r| u64::from(r.best_score.value()))
            .sum();

        // 50 * completed / count + 50 * total / (count * 100), on a common denominator
        let blended = (5_000 * completed + 50 * total) / (100 * count);
        u8::try_from(blended.min(100)).unwrap_or(100)
    }

    fn reevaluate(&mut self) -> Vec<StatusChange> {
        let changes = self.policy.apply(&mut self.records, self.full_features_override);
        for change in &changes {
            info!(
                task = %change.task_id,
                from = %change.from,
                to = %change.to,
                "advanced task status changed"
            );
        }
        changes
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
