use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{QuestionOutcome, Score, SessionId, TaskId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TaskResultError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("too many questions for a single session: {len}")]
    TooManyQuestions { len: usize },

    #[error("solved questions ({solved}) exceed closed questions ({closed})")]
    CountMismatch { closed: u32, solved: u32 },
}

/// Summary of one finished task session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskResult {
    task_id: TaskId,
    session_id: SessionId,
    score: Score,
    points: u32,
    questions_closed: u32,
    questions_solved: u32,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
}

impl TaskResult {
    /// Rehydrate a task result from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `TaskResultError` if timestamps or counts are inconsistent.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        task_id: TaskId,
        session_id: SessionId,
        score: Score,
        points: u32,
        questions_closed: u32,
        questions_solved: u32,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, TaskResultError> {
        if completed_at < started_at {
            return Err(TaskResultError::InvalidTimeRange);
        }
        if questions_solved > questions_closed {
            return Err(TaskResultError::CountMismatch {
                closed: questions_closed,
                solved: questions_solved,
            });
        }

        Ok(Self {
            task_id,
            session_id,
            score,
            points,
            questions_closed,
            questions_solved,
            started_at,
            completed_at,
        })
    }

    /// Build a result from the closed outcomes of a session.
    ///
    /// # Errors
    ///
    /// Returns `TaskResultError::InvalidTimeRange` if `completed_at` is before `started_at`.
    /// Returns `TaskResultError::TooManyQuestions` if the count cannot fit in `u32`.
    pub fn from_outcomes(
        task_id: TaskId,
        session_id: SessionId,
        score: Score,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        outcomes: &[QuestionOutcome],
    ) -> Result<Self, TaskResultError> {
        let questions_closed = u32::try_from(outcomes.len())
            .map_err(|_| TaskResultError::TooManyQuestions {
                len: outcomes.len(),
            })?;
        let mut points = 0_u32;
        let mut solved = 0_u32;
        for outcome in outcomes {
            points = points.saturating_add(outcome.points());
            if outcome.is_solved() {
                solved = solved.saturating_add(1);
            }
        }

        Self::from_persisted(
            task_id,
            session_id,
            score,
            points,
            questions_closed,
            solved,
            started_at,
            completed_at,
        )
    }

    #[must_use]
    pub fn task_id(&self) -> TaskId {
        self.task_id
    }

    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    #[must_use]
    pub fn score(&self) -> Score {
        self.score
    }

    #[must_use]
    pub fn points(&self) -> u32 {
        self.points
    }

    #[must_use]
    pub fn questions_closed(&self) -> u32 {
        self.questions_closed
    }

    #[must_use]
    pub fn questions_solved(&self) -> u32 {
        self.questions_solved
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Ordinal;
    use crate::time::fixed_now;

    #[test]
    fn result_counts_points_and_solved() {
        let now = fixed_now();
        let outcomes = [
            QuestionOutcome::Solved(Ordinal::FIRST),
            QuestionOutcome::Unsolved,
            QuestionOutcome::Solved(Ordinal::LAST),
        ];

        let result = TaskResult::from_outcomes(
            TaskId::AreaCalculation,
            SessionId::generate(),
            Score::new(44).unwrap(),
            now,
            now,
            &outcomes,
        )
        .unwrap();

        assert_eq!(result.questions_closed(), 3);
        assert_eq!(result.questions_solved(), 2);
        assert_eq!(result.points(), 4);
    }

    #[test]
    fn rejects_inverted_time_range() {
        let now = fixed_now();
        let err = TaskResult::from_outcomes(
            TaskId::AreaCalculation,
            SessionId::generate(),
            Score::ZERO,
            now,
            now - chrono::Duration::seconds(1),
            &[],
        )
        .unwrap_err();
        assert_eq!(err, TaskResultError::InvalidTimeRange);
    }

    #[test]
    fn rejects_more_solved_than_closed() {
        let now = fixed_now();
        let err = TaskResult::from_persisted(
            TaskId::SectorCalculation,
            SessionId::generate(),
            Score::ZERO,
            0,
            1,
            2,
            now,
            now,
        )
        .unwrap_err();
        assert!(matches!(err, TaskResultError::CountMismatch { .. }));
    }
}
