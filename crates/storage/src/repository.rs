use async_trait::async_trait;
use mastery_core::model::{TaskId, TaskResult};
use mastery_core::progress::ProgressSnapshot;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// A persisted task result with its storage id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskResultRow {
    pub id: i64,
    pub result: TaskResult,
}

impl TaskResultRow {
    #[must_use]
    pub fn new(id: i64, result: TaskResult) -> Self {
        Self { id, result }
    }
}

/// Repository contract for the registry's persistence view.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Load the last saved snapshot, or `None` if nothing was ever saved.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the stored data cannot be read or decoded.
    async fn load_progress(&self) -> Result<Option<ProgressSnapshot>, StorageError>;

    /// Replace the stored snapshot.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be stored.
    async fn save_progress(&self, snapshot: &ProgressSnapshot) -> Result<(), StorageError>;
}

#[async_trait]
pub trait TaskResultRepository: Send + Sync {
    /// Append a finished task result and return its id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the result cannot be stored.
    async fn append_result(&self, result: &TaskResult) -> Result<i64, StorageError>;

    /// Fetch a result by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_result(&self, id: i64) -> Result<TaskResult, StorageError>;

    /// Most recent results for a task, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on read failures.
    async fn list_results(
        &self,
        task_id: TaskId,
        limit: u32,
    ) -> Result<Vec<TaskResultRow>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    progress: Arc<Mutex<Option<ProgressSnapshot>>>,
    results: Arc<Mutex<Vec<TaskResult>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn load_progress(&self) -> Result<Option<ProgressSnapshot>, StorageError> {
        let guard = self.progress.lock().map_err(poisoned)?;
        Ok(guard.clone())
    }

    async fn save_progress(&self, snapshot: &ProgressSnapshot) -> Result<(), StorageError> {
        let mut guard = self.progress.lock().map_err(poisoned)?;
        *guard = Some(snapshot.clone());
        Ok(())
    }
}

#[async_trait]
impl TaskResultRepository for InMemoryRepository {
    async fn append_result(&self, result: &TaskResult) -> Result<i64, StorageError> {
        let mut guard = self.results.lock().map_err(poisoned)?;
        if guard.iter().any(|r| r.session_id() == result.session_id()) {
            return Err(StorageError::Conflict);
        }
        guard.push(result.clone());
        i64::try_from(guard.len()).map_err(|_| StorageError::Conflict)
    }

    async fn get_result(&self, id: i64) -> Result<TaskResult, StorageError> {
        let guard = self.results.lock().map_err(poisoned)?;
        usize::try_from(id)
            .ok()
            .and_then(|id| id.checked_sub(1))
            .and_then(|idx| guard.get(idx))
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn list_results(
        &self,
        task_id: TaskId,
        limit: u32,
    ) -> Result<Vec<TaskResultRow>, StorageError> {
        let guard = self.results.lock().map_err(poisoned)?;
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        let mut rows = Vec::new();
        for (idx, result) in guard.iter().enumerate().rev() {
            if rows.len() >= limit {
                break;
            }
            if result.task_id() == task_id {
                let id = i64::try_from(idx + 1).map_err(|_| StorageError::Conflict)?;
                rows.push(TaskResultRow::new(id, result.clone()));
            }
        }
        Ok(rows)
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRepository>,
    pub results: Arc<dyn TaskResultRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo.clone());
        let results: Arc<dyn TaskResultRepository> = Arc::new(repo);
        Self { progress, results }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mastery_core::model::{Score, SessionId};
    use mastery_core::time::fixed_now;
    use mastery_core::ProgressRegistry;

    fn build_result(task_id: TaskId, score: u32) -> TaskResult {
        let now = fixed_now();
        TaskResult::from_persisted(
            task_id,
            SessionId::generate(),
            Score::new(score).unwrap(),
            0,
            0,
            0,
            now,
            now,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn progress_starts_empty_and_round_trips() {
        let repo = InMemoryRepository::new();
        assert!(repo.load_progress().await.unwrap().is_none());

        let mut registry = ProgressRegistry::default();
        registry.report_task_result(TaskId::AreaCalculation, Score::new(88).unwrap());
        let snapshot = registry.snapshot();
        repo.save_progress(&snapshot).await.unwrap();

        assert_eq!(repo.load_progress().await.unwrap(), Some(snapshot));
    }

    #[tokio::test]
    async fn results_are_listed_newest_first_per_task() {
        let repo = InMemoryRepository::new();
        let first = repo
            .append_result(&build_result(TaskId::AreaCalculation, 40))
            .await
            .unwrap();
        repo.append_result(&build_result(TaskId::SectorCalculation, 10))
            .await
            .unwrap();
        let third = repo
            .append_result(&build_result(TaskId::AreaCalculation, 90))
            .await
            .unwrap();

        let rows = repo.list_results(TaskId::AreaCalculation, 10).await.unwrap();
        let ids: Vec<_> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![third, first]);

        let limited = repo.list_results(TaskId::AreaCalculation, 1).await.unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].result.score().value(), 90);

        assert!(matches!(
            repo.get_result(99).await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn duplicate_session_result_conflicts() {
        let repo = InMemoryRepository::new();
        let result = build_result(TaskId::CircleCalculation, 70);
        let id = repo.append_result(&result).await.unwrap();

        let err = repo.append_result(&result).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict));
        assert_eq!(
            repo.list_results(TaskId::CircleCalculation, 10)
                .await
                .unwrap()
                .len(),
            1
        );
        assert_eq!(repo.get_result(id).await.unwrap(), result);
    }
}
