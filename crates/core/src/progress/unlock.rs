use crate::model::{Score, TaskId, TaskRecord, TaskStatus, UserLevel};
use crate::settings::LevelThresholds;

use super::RecordTable;

/// A status change produced while re-evaluating the advanced tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub task_id: TaskId,
    pub from: TaskStatus,
    pub to: TaskStatus,
}

/// Decides whether the advanced tier is open.
///
/// The gate is all-or-nothing: either every advanced task is eligible or
/// none is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnlockPolicy {
    threshold: Score,
}

impl UnlockPolicy {
    #[must_use]
    pub fn new(threshold: Score) -> Self {
        Self { threshold }
    }

    #[must_use]
    pub fn threshold(&self) -> Score {
        self.threshold
    }

    /// True when every basic task reached the threshold.
    #[must_use]
    pub fn basic_tier_qualifies(&self, records: &RecordTable) -> bool {
        TaskId::basic().all(|id| records[id.index()].best_score >= self.threshold)
    }

    #[must_use]
    pub fn advanced_eligible(
        &self,
        records: &RecordTable,
        full_features_override: bool,
    ) -> bool {
        full_features_override || self.basic_tier_qualifies(records)
    }

    /// Bring every advanced task in line with the gate.
    ///
    /// Completed tasks are never touched. Eligible locked tasks become
    /// unlocked; ineligible tasks that are not completed go back to locked.
    pub fn apply(
        &self,
        records: &mut RecordTable,
        full_features_override: bool,
    ) -> Vec<StatusChange> {
        let eligible = self.advanced_eligible(records, full_features_override);
        let mut changes = Vec::new();

        for id in TaskId::advanced() {
            let record = &mut records[id.index()];
            let next = match (record.status, eligible) {
                (TaskStatus::Completed, _) => continue,
                (TaskStatus::Locked, true) => TaskStatus::Unlocked,
                (_, true) => continue,
                (TaskStatus::Locked, false) => continue,
                (_, false) => TaskStatus::Locked,
            };
            changes.push(StatusChange {
                task_id: id,
                from: record.status,
                to: next,
            });
            record.status = next;
        }

        changes
    }
}

/// Level for the given records, highest tier first.
#[must_use]
pub fn derive_level(records: &[TaskRecord], thresholds: &LevelThresholds) -> UserLevel {
    let total: u32 = records.iter().map(|r| r.best_score.value()).sum();
    let completed = u32::try_from(records.iter().filter(|r| r.status.is_completed()).count())
        .unwrap_or(u32::MAX);

    if thresholds.expert.is_met(total, completed) {
        UserLevel::Expert
    } else if thresholds.advanced.is_met(total, completed) {
        UserLevel::Advanced
    } else if thresholds.intermediate.is_met(total, completed) {
        UserLevel::Intermediate
    } else {
        UserLevel::Beginner
    }
}
