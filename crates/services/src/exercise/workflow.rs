use std::sync::Arc;

use mastery_core::TaskSession;
use mastery_core::model::{AttemptOutcome, QuestionKey, TaskId};
use mastery_core::session::SessionProgress;
use storage::repository::{TaskResultRepository, TaskResultRow};
use tracing::{debug, error, info};

use super::state::Exercise;
use crate::Clock;
use crate::error::ExerciseError;
use crate::progress_service::{ProgressService, TaskReport};

/// Result of answering a single question attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseAnswer {
    pub outcome: AttemptOutcome,
    pub progress: SessionProgress,
    pub is_complete: bool,
    pub result_id: Option<i64>,
    /// Present on the answer that completed the task.
    pub report: Option<TaskReport>,
}

/// Orchestrates task start, scored answering and result persistence.
#[derive(Clone)]
pub struct ExerciseLoopService {
    clock: Clock,
    progress: Arc<ProgressService>,
    results: Arc<dyn TaskResultRepository>,
}

impl ExerciseLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        progress: Arc<ProgressService>,
        results: Arc<dyn TaskResultRepository>,
    ) -> Self {
        Self {
            clock,
            progress,
            results,
        }
    }

    /// Select `task_id` and open a fresh session for it.
    ///
    /// # Errors
    ///
    /// Returns `ExerciseError::TaskLocked` if the task's tier is locked, or a
    /// progress error if the selection cannot be saved.
    pub async fn start_exercise(&self, task_id: TaskId) -> Result<Exercise, ExerciseError> {
        self.progress.select_task(task_id).await?;
        let session = TaskSession::new(task_id, self.clock.now());
        debug!(task = %task_id, session = %session.id(), "exercise started");
        Ok(Exercise::new(session))
    }

    /// Record one attempt. When it completes the task the result is persisted
    /// and the final score reported to the progress registry.
    ///
    /// # Errors
    ///
    /// Returns `ExerciseError::AlreadyFinished` once the exercise was reported,
    /// `ExerciseError::InvalidAttempt` for closed questions, and storage or
    /// progress errors when finalizing fails. A failed finalization can be
    /// retried with `finish`.
    pub async fn answer(
        &self,
        exercise: &mut Exercise,
        key: QuestionKey,
        correct: bool,
    ) -> Result<ExerciseAnswer, ExerciseError> {
        if exercise.is_finished() {
            return Err(ExerciseError::AlreadyFinished);
        }

        let outcome = exercise.session_mut().record_attempt(key, correct)?;
        let report = if exercise.session().is_complete() {
            Some(self.finalize(exercise).await?)
        } else {
            None
        };

        Ok(ExerciseAnswer {
            outcome,
            progress: exercise.progress(),
            is_complete: exercise.session().is_complete(),
            result_id: exercise.result_id(),
            report,
        })
    }

    /// End the task now and report whatever was scored.
    ///
    /// Also retries a finalization that failed inside `answer`.
    ///
    /// # Errors
    ///
    /// Returns `ExerciseError::AlreadyFinished` if the score was already
    /// reported, `ExerciseError::NothingAnswered` if no question was closed,
    /// and storage or progress errors when persistence fails.
    pub async fn finish(&self, exercise: &mut Exercise) -> Result<TaskReport, ExerciseError> {
        if exercise.is_finished() {
            return Err(ExerciseError::AlreadyFinished);
        }
        if exercise.session().closed_count() == 0 {
            return Err(ExerciseError::NothingAnswered);
        }
        self.finalize(exercise).await
    }

    /// Discard the attempts of `exercise` and start the same task over.
    ///
    /// # Errors
    ///
    /// Returns `ExerciseError::TaskLocked` if the task was relocked meanwhile.
    pub async fn restart(&self, exercise: &mut Exercise) -> Result<(), ExerciseError> {
        self.progress.select_task(exercise.task_id()).await?;
        exercise.restart();
        debug!(task = %exercise.task_id(), session = %exercise.id(), "exercise restarted");
        Ok(())
    }

    /// Most recent persisted results for `task_id`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ExerciseError::Storage` if the query fails.
    pub async fn recent_results(
        &self,
        task_id: TaskId,
        limit: u32,
    ) -> Result<Vec<TaskResultRow>, ExerciseError> {
        Ok(self.results.list_results(task_id, limit).await?)
    }

    async fn finalize(&self, exercise: &mut Exercise) -> Result<TaskReport, ExerciseError> {
        let result = exercise.session().build_result(self.clock.now())?;

        if exercise.result_id().is_none() {
            let id = self.results.append_result(&result).await.map_err(|err| {
                error!(%err, task = %result.task_id(), "failed to persist task result");
                err
            })?;
            exercise.set_result_id(id);
        }

        let report = self
            .progress
            .report_task_result(result.task_id(), result.score())
            .await?;
        exercise.set_report(report.clone());

        info!(
            task = %result.task_id(),
            score = %result.score(),
            solved = result.questions_solved(),
            closed = result.questions_closed(),
            "exercise finished"
        );
        Ok(report)
    }
}
