use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::TaskId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScoreError {
    #[error("score must be within 0..=100, got {0}")]
    OutOfRange(u32),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid task status: {raw}")]
pub struct ParseStatusError {
    raw: String,
}

//
// ─── SCORE ─────────────────────────────────────────────────────────────────────
//

/// Task score on a 0..=100 scale.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "u32", into = "u32")]
pub struct Score(u8);

impl Score {
    pub const ZERO: Score = Score(0);
    pub const MAX: Score = Score(100);

    /// # Errors
    ///
    /// Returns `ScoreError::OutOfRange` if `value > 100`.
    pub fn new(value: u32) -> Result<Self, ScoreError> {
        u8::try_from(value)
            .ok()
            .filter(|v| *v <= 100)
            .map(Self)
            .ok_or(ScoreError::OutOfRange(value))
    }

    /// Clamps `value` into range instead of failing.
    #[must_use]
    pub fn saturating(value: u32) -> Self {
        Self(u8::try_from(value.min(100)).unwrap_or(100))
    }

    #[must_use]
    pub fn value(self) -> u32 {
        u32::from(self.0)
    }
}

impl TryFrom<u32> for Score {
    type Error = ScoreError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Score> for u32 {
    fn from(value: Score) -> Self {
        value.value()
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//
// ─── STATUS ────────────────────────────────────────────────────────────────────
//

/// Lifecycle of a task in the registry.
///
/// `Locked -> Unlocked -> InProgress -> Completed`. A completed task can be
/// retried but never drops below `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Locked,
    Unlocked,
    InProgress,
    Completed,
}

impl TaskStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Locked => "locked",
            TaskStatus::Unlocked => "unlocked",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }

    #[must_use]
    pub fn is_locked(self) -> bool {
        self == TaskStatus::Locked
    }

    #[must_use]
    pub fn is_completed(self) -> bool {
        self == TaskStatus::Completed
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "locked" => Ok(TaskStatus::Locked),
            "unlocked" => Ok(TaskStatus::Unlocked),
            "in_progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            _ => Err(ParseStatusError { raw: s.to_string() }),
        }
    }
}

//
// ─── TASK RECORD ───────────────────────────────────────────────────────────────
//

/// Registry entry for one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub status: TaskStatus,
    pub best_score: Score,
}

impl TaskRecord {
    /// Starting record: basic tasks are open, advanced ones locked.
    #[must_use]
    pub fn initial(task_id: TaskId) -> Self {
        let status = if task_id.is_basic() {
            TaskStatus::Unlocked
        } else {
            TaskStatus::Locked
        };
        Self {
            status,
            best_score: Score::ZERO,
        }
    }
}

//
// ─── STATIC TASK CONFIGURATION ─────────────────────────────────────────────────
//

/// When a task session counts as finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionRule {
    /// Finished once this many questions have closed.
    FixedCount(u32),
    /// Finished once this many distinct categories have been solved.
    CategoryCoverage(u32),
}

/// How a session's points turn into a reported score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreMode {
    /// `100 * points / (closed * 3)`, rounded down.
    #[default]
    Percentage,
    /// Raw point total, capped at 100.
    RawPoints,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskConfig {
    pub completion: CompletionRule,
    pub score_mode: ScoreMode,
}

impl TaskConfig {
    #[must_use]
    pub const fn new(completion: CompletionRule, score_mode: ScoreMode) -> Self {
        Self {
            completion,
            score_mode,
        }
    }
}

impl TaskId {
    /// Completion rule and score mode for this task's exercise.
    #[must_use]
    pub const fn config(self) -> TaskConfig {
        use CompletionRule::{CategoryCoverage, FixedCount};
        use ScoreMode::{Percentage, RawPoints};

        match self {
            TaskId::ShapeRecognition2D | TaskId::ShapeRecognition3D => {
                TaskConfig::new(FixedCount(6), Percentage)
            }
            // acute, right, obtuse, straight/reflex
            TaskId::AngleClassification => TaskConfig::new(CategoryCoverage(4), Percentage),
            TaskId::AreaCalculation => TaskConfig::new(FixedCount(4), Percentage),
            // radius, diameter, circumference, area
            TaskId::CircleCalculation => TaskConfig::new(FixedCount(4), Percentage),
            TaskId::CompoundShapeArea => TaskConfig::new(FixedCount(9), RawPoints),
            TaskId::SectorCalculation => TaskConfig::new(FixedCount(4), Percentage),
        }
    }
}
