//! Per-instance accumulator for one run through an exercise.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::trace;

use crate::model::{
    AttemptOutcome, Category, CompletionRule, Ordinal, QuestionKey, QuestionOutcome, Score,
    ScoreMode, SessionId, TaskConfig, TaskId, TaskResult, TaskResultError,
};
use crate::scoring::MAX_POINTS_PER_QUESTION;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Attempt submitted where none is accepted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvalidAttempt {
    #[error("question {key} is already closed")]
    QuestionClosed { key: QuestionKey },

    #[error("task session is already complete")]
    SessionComplete,

    #[error("question {key} was first recorded under a different category")]
    CategoryMismatch {
        key: QuestionKey,
        expected: Option<Category>,
    },
}

//
// ─── PROGRESS ──────────────────────────────────────────────────────────────────
//

/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProgress {
    pub closed: usize,
    pub solved: usize,
    pub open: usize,
    pub points: u32,
    pub categories_covered: usize,
    pub is_complete: bool,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Records attempts for one task instance and scores them.
///
/// Owned by the exercise that created it and never shared. Questions are
/// identified by `QuestionKey::id`; each accepts at most three attempts and
/// closes on the first correct one. The category seen on the first attempt
/// sticks to the question.
#[derive(Debug, Clone)]
pub struct TaskSession {
    id: SessionId,
    task_id: TaskId,
    config: TaskConfig,
    started_at: DateTime<Utc>,
    open: HashMap<u32, (QuestionKey, Ordinal)>,
    closed: Vec<(QuestionKey, QuestionOutcome)>,
}

impl TaskSession {
    /// Start a session using the task's static configuration.
    #[must_use]
    pub fn new(task_id: TaskId, started_at: DateTime<Utc>) -> Self {
        Self::with_config(task_id, task_id.config(), started_at)
    }

    #[must_use]
    pub fn with_config(task_id: TaskId, config: TaskConfig, started_at: DateTime<Utc>) -> Self {
        Self {
            id: SessionId::generate(),
            task_id,
            config,
            started_at,
            open: HashMap::new(),
            closed: Vec::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn task_id(&self) -> TaskId {
        self.task_id
    }

    #[must_use]
    pub fn config(&self) -> TaskConfig {
        self.config
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Closed questions in the order they closed.
    pub fn outcomes(&self) -> impl Iterator<Item = QuestionOutcome> + '_ {
        self.closed.iter().map(|(_, outcome)| *outcome)
    }

    #[must_use]
    pub fn closed_count(&self) -> usize {
        self.closed.len()
    }

    /// Outcome of a question if it has closed.
    #[must_use]
    pub fn outcome_of(&self, key: &QuestionKey) -> Option<QuestionOutcome> {
        self.closed
            .iter()
            .find(|(k, _)| k.id() == key.id())
            .map(|(_, outcome)| *outcome)
    }

    /// Record one submission for `key`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAttempt::QuestionClosed` if the question was already
    /// solved or used all three attempts, `InvalidAttempt::CategoryMismatch`
    /// if an open question comes back with another category, and
    /// `InvalidAttempt::SessionComplete` once the completion rule is satisfied.
    pub fn record_attempt(
        &mut self,
        key: QuestionKey,
        correct: bool,
    ) -> Result<AttemptOutcome, InvalidAttempt> {
        if self.is_complete() {
            return Err(InvalidAttempt::SessionComplete);
        }
        if self.outcome_of(&key).is_some() {
            return Err(InvalidAttempt::QuestionClosed { key });
        }

        let ordinal = match self.open.get(&key.id()) {
            Some((first, _)) if first.category() != key.category() => {
                return Err(InvalidAttempt::CategoryMismatch {
                    expected: first.category().cloned(),
                    key,
                });
            }
            Some((_, previous)) => previous
                .next()
                .ok_or_else(|| InvalidAttempt::QuestionClosed { key: key.clone() })?,
            None => Ordinal::FIRST,
        };

        let outcome = if correct {
            QuestionOutcome::Solved(ordinal)
        } else if ordinal.is_last() {
            QuestionOutcome::Unsolved
        } else {
            self.open.insert(key.id(), (key, ordinal));
            return Ok(AttemptOutcome::Pending {
                next: ordinal.next().unwrap_or(Ordinal::LAST),
            });
        };

        trace!(task = %self.task_id, question = %key, ?outcome, "question closed");
        self.open.remove(&key.id());
        self.closed.push((key, outcome));
        Ok(AttemptOutcome::Closed(outcome))
    }

    /// Whether the task's completion rule holds for the questions closed so far.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        match self.config.completion {
            CompletionRule::FixedCount(n) => self.closed.len() >= n as usize,
            CompletionRule::CategoryCoverage(k) => self.covered_categories().len() >= k as usize,
        }
    }

    /// Sum of points over closed questions.
    #[must_use]
    pub fn points(&self) -> u32 {
        self.outcomes().map(QuestionOutcome::points).sum()
    }

    /// Session score on the 0..=100 scale.
    ///
    /// With no closed questions the score is zero.
    #[must_use]
    pub fn final_score(&self) -> Score {
        let points = self.points();
        match self.config.score_mode {
            ScoreMode::Percentage => {
                let closed = u32::try_from(self.closed.len()).unwrap_or(u32::MAX);
                if closed == 0 {
                    return Score::ZERO;
                }
                let max = u64::from(closed) * u64::from(MAX_POINTS_PER_QUESTION);
                let pct = 100 * u64::from(points) / max;
                Score::saturating(u32::try_from(pct).unwrap_or(100))
            }
            ScoreMode::RawPoints => Score::saturating(points),
        }
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            closed: self.closed.len(),
            solved: self.outcomes().filter(|o| o.is_solved()).count(),
            open: self.open.len(),
            points: self.points(),
            categories_covered: self.covered_categories().len(),
            is_complete: self.is_complete(),
        }
    }

    /// Drop every recorded attempt. The session gets a fresh id; the start
    /// time is kept.
    pub fn reset(&mut self) {
        self.id = SessionId::generate();
        self.open.clear();
        self.closed.clear();
    }

    /// Summarize the session for persistence.
    ///
    /// # Errors
    ///
    /// Returns `TaskResultError` if `completed_at` precedes the start time.
    pub fn build_result(&self, completed_at: DateTime<Utc>) -> Result<TaskResult, TaskResultError> {
        let outcomes: Vec<_> = self.outcomes().collect();
        TaskResult::from_outcomes(
            self.task_id,
            self.id,
            self.final_score(),
            self.started_at,
            completed_at,
            &outcomes,
        )
    }

    fn covered_categories(&self) -> BTreeSet<&Category> {
        self.closed
            .iter()
            .filter(|(_, outcome)| outcome.is_solved())
            .filter_map(|(key, _)| key.category())
            .collect()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
