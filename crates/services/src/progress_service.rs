use std::sync::Arc;

use mastery_core::model::{Score, TaskId, TaskRecord};
use mastery_core::progress::{ProgressSnapshot, StatusChange};
use mastery_core::{ProgressRegistry, ProgressionSettings};
use storage::repository::ProgressRepository;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info};

use crate::error::ProgressServiceError;

/// What a reported result changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskReport {
    pub task_id: TaskId,
    pub final_score: Score,
    pub record: TaskRecord,
    pub changes: Vec<StatusChange>,
    pub snapshot: ProgressSnapshot,
}

impl TaskReport {
    /// Advanced tasks that opened because of this report.
    pub fn newly_unlocked(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.changes
            .iter()
            .filter(|c| c.from.is_locked() && !c.to.is_locked())
            .map(|c| c.task_id)
    }
}

/// Shared, persisted owner of the `ProgressRegistry`.
///
/// Mutations are serialized through one writer. Each mutation runs on a copy
/// of the registry, is saved, and only then replaces the committed state, so
/// a failed save leaves everything as it was. Reads see the last committed
/// state and never wait on a save in flight.
pub struct ProgressService {
    repo: Arc<dyn ProgressRepository>,
    settings: ProgressionSettings,
    writer: Mutex<ProgressRegistry>,
    committed: RwLock<ProgressRegistry>,
}

impl ProgressService {
    /// Restore the registry from storage, or start fresh if nothing was saved.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError` if storage fails or the saved snapshot
    /// is inconsistent.
    pub async fn load(
        settings: ProgressionSettings,
        repo: Arc<dyn ProgressRepository>,
    ) -> Result<Self, ProgressServiceError> {
        let registry = match repo.load_progress().await? {
            Some(snapshot) => {
                info!(level = %snapshot.user_level, "restored saved progress");
                ProgressRegistry::from_snapshot(&snapshot, settings)?
            }
            None => {
                info!("no saved progress, starting fresh");
                ProgressRegistry::new(settings)
            }
        };

        Ok(Self {
            repo,
            settings,
            writer: Mutex::new(registry.clone()),
            committed: RwLock::new(registry),
        })
    }

    #[must_use]
    pub fn settings(&self) -> ProgressionSettings {
        self.settings
    }

    /// Keep the best score for `task_id`, mark it completed, and persist.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the new state cannot be saved.
    pub async fn report_task_result(
        &self,
        task_id: TaskId,
        final_score: Score,
    ) -> Result<TaskReport, ProgressServiceError> {
        let (changes, registry) = self
            .commit(|registry| Ok(registry.report_task_result(task_id, final_score)))
            .await?;

        let report = TaskReport {
            task_id,
            final_score,
            record: registry.record(task_id),
            changes,
            snapshot: registry.snapshot(),
        };
        info!(
            task = %task_id,
            score = %final_score,
            best = %report.record.best_score,
            level = %report.snapshot.user_level,
            "task result recorded"
        );
        Ok(report)
    }

    /// Mark a task as being worked on.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::TaskLocked` if the tier gate is closed.
    pub async fn select_task(&self, task_id: TaskId) -> Result<(), ProgressServiceError> {
        let result = self
            .commit(|registry| registry.select_task(task_id).map_err(Into::into))
            .await;
        if let Err(ProgressServiceError::TaskLocked(locked)) = &result {
            info!(task = %locked.task_id, "locked task selected");
        }
        result.map(|_| ())
    }

    /// Toggle the full-features override and persist.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the new state cannot be saved.
    pub async fn set_full_features_override(
        &self,
        enabled: bool,
    ) -> Result<Vec<StatusChange>, ProgressServiceError> {
        let (changes, _) = self
            .commit(|registry| Ok(registry.set_full_features_override(enabled)))
            .await?;
        Ok(changes)
    }

    /// Latest committed state.
    pub async fn snapshot(&self) -> ProgressSnapshot {
        self.committed.read().await.snapshot()
    }

    pub async fn overall_progress(&self) -> u8 {
        self.committed.read().await.calculate_overall_progress()
    }

    /// Serialize the committed state as JSON.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Json` if serialization fails.
    pub async fn export_json(&self) -> Result<String, ProgressServiceError> {
        let snapshot = self.snapshot().await;
        Ok(serde_json::to_string_pretty(&snapshot)?)
    }

    /// Replace the whole state with a previously exported snapshot.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError` if the JSON is malformed, the snapshot
    /// is inconsistent, or it cannot be saved.
    pub async fn import_json(&self, json: &str) -> Result<ProgressSnapshot, ProgressServiceError> {
        let snapshot: ProgressSnapshot = serde_json::from_str(json)?;
        let restored = ProgressRegistry::from_snapshot(&snapshot, self.settings)?;
        let (_, registry) = self
            .commit(move |registry| {
                *registry = restored;
                Ok(())
            })
            .await?;
        info!(level = %registry.user_level(), "progress imported");
        Ok(registry.snapshot())
    }

    async fn commit<T>(
        &self,
        mutate: impl FnOnce(&mut ProgressRegistry) -> Result<T, ProgressServiceError>,
    ) -> Result<(T, ProgressRegistry), ProgressServiceError> {
        let mut writer = self.writer.lock().await;
        let mut next = writer.clone();
        let out = mutate(&mut next)?;

        if next != *writer {
            if let Err(err) = self.repo.save_progress(&next.snapshot()).await {
                error!(%err, "failed to persist progress");
                return Err(err.into());
            }
            *self.committed.write().await = next.clone();
            *writer = next.clone();
        }

        Ok((out, next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mastery_core::model::TaskStatus;
    use storage::repository::{InMemoryRepository, StorageError};

    struct FailingRepo;

    #[async_trait]
    impl ProgressRepository for FailingRepo {
        async fn load_progress(&self) -> Result<Option<ProgressSnapshot>, StorageError> {
            Ok(None)
        }

        async fn save_progress(&self, _snapshot: &ProgressSnapshot) -> Result<(), StorageError> {
            Err(StorageError::Connection("disk full".into()))
        }
    }

    fn score(v: u32) -> Score {
        Score::new(v).unwrap()
    }

    #[tokio::test]
    async fn failed_save_leaves_state_untouched() {
        let service = ProgressService::load(ProgressionSettings::default(), Arc::new(FailingRepo))
            .await
            .unwrap();

        let err = service
            .report_task_result(TaskId::AreaCalculation, score(90))
            .await
            .unwrap_err();
        assert!(matches!(err, ProgressServiceError::Storage(_)));

        let snapshot = service.snapshot().await;
        let record = snapshot.record(TaskId::AreaCalculation).unwrap();
        assert_eq!(record.best_score, Score::ZERO);
        assert_eq!(record.status, TaskStatus::Unlocked);
    }

    #[tokio::test]
    async fn locked_selection_is_not_persisted() {
        let repo = InMemoryRepository::new();
        let service =
            ProgressService::load(ProgressionSettings::default(), Arc::new(repo.clone()))
                .await
                .unwrap();

        let err = service
            .select_task(TaskId::CompoundShapeArea)
            .await
            .unwrap_err();
        assert!(matches!(err, ProgressServiceError::TaskLocked(_)));
        assert!(repo.load_progress().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn report_lists_newly_unlocked_tasks() {
        let service = ProgressService::load(
            ProgressionSettings::default(),
            Arc::new(InMemoryRepository::new()),
        )
        .await
        .unwrap();

        let mut last = None;
        for id in TaskId::basic() {
            last = Some(service.report_task_result(id, score(70)).await.unwrap());
        }
        let report = last.unwrap();
        let unlocked: Vec<_> = report.newly_unlocked().collect();
        assert_eq!(
            unlocked,
            vec![TaskId::CompoundShapeArea, TaskId::SectorCalculation]
        );
        assert_eq!(report.record.status, TaskStatus::Completed);
        assert_eq!(service.overall_progress().await, 60);
    }

    #[tokio::test]
    async fn export_then_import_restores_state() {
        let service = ProgressService::load(
            ProgressionSettings::default(),
            Arc::new(InMemoryRepository::new()),
        )
        .await
        .unwrap();
        service
            .report_task_result(TaskId::CircleCalculation, score(77))
            .await
            .unwrap();
        service.set_full_features_override(true).await.unwrap();
        let exported = service.export_json().await.unwrap();

        let other = ProgressService::load(
            ProgressionSettings::default(),
            Arc::new(InMemoryRepository::new()),
        )
        .await
        .unwrap();
        let imported = other.import_json(&exported).await.unwrap();

        assert_eq!(imported, service.snapshot().await);
        assert!(other.import_json("{ not json").await.is_err());
    }
}
