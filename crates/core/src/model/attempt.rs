use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::scoring::{self, MAX_ATTEMPTS};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CategoryError {
    #[error("category label cannot be empty")]
    Empty,
}

//
// ─── ORDINAL ───────────────────────────────────────────────────────────────────
//

/// Position of an attempt within a question, always in `1..=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Ordinal(u8);

impl Ordinal {
    pub const FIRST: Ordinal = Ordinal(1);
    pub const LAST: Ordinal = Ordinal(MAX_ATTEMPTS);

    /// Returns `None` unless `value` is in `1..=MAX_ATTEMPTS`.
    #[must_use]
    pub fn new(value: u8) -> Option<Self> {
        (1..=MAX_ATTEMPTS).contains(&value).then_some(Self(value))
    }

    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn is_last(self) -> bool {
        self == Self::LAST
    }

    #[must_use]
    pub fn next(self) -> Option<Self> {
        Self::new(self.0 + 1)
    }
}

impl TryFrom<u8> for Ordinal {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("attempt ordinal out of range: {value}"))
    }
}

impl From<Ordinal> for u8 {
    fn from(value: Ordinal) -> Self {
        value.0
    }
}

//
// ─── CATEGORY / QUESTION KEY ───────────────────────────────────────────────────
//

/// Label describing what a question tests (e.g. "obtuse" for an angle).
///
/// Trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Category(String);

impl Category {
    /// # Errors
    ///
    /// Returns `CategoryError::Empty` if the label is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, CategoryError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CategoryError::Empty);
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifies one question within a task session.
///
/// The exercise picks the `id`, which alone identifies the question; the
/// category is a label carried along for coverage. The engine never looks at
/// question content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuestionKey {
    id: u32,
    category: Option<Category>,
}

impl QuestionKey {
    #[must_use]
    pub fn new(id: u32) -> Self {
        Self { id, category: None }
    }

    #[must_use]
    pub fn with_category(id: u32, category: Category) -> Self {
        Self {
            id,
            category: Some(category),
        }
    }

    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[must_use]
    pub fn category(&self) -> Option<&Category> {
        self.category.as_ref()
    }
}

impl fmt::Display for QuestionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.category {
            Some(category) => write!(f, "#{} ({category})", self.id),
            None => write!(f, "#{}", self.id),
        }
    }
}

//
// ─── ATTEMPT / OUTCOMES ────────────────────────────────────────────────────────
//

/// Final result of a closed question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionOutcome {
    /// Correct on the given attempt.
    Solved(Ordinal),
    /// Never correct within the attempt cap.
    Unsolved,
}

impl QuestionOutcome {
    #[must_use]
    pub fn points(self) -> u32 {
        scoring::points_for_outcome(self)
    }

    #[must_use]
    pub fn is_solved(self) -> bool {
        matches!(self, QuestionOutcome::Solved(_))
    }
}

/// What `TaskSession::record_attempt` reports back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Incorrect, and another attempt is allowed.
    Pending { next: Ordinal },
    /// The question is closed.
    Closed(QuestionOutcome),
}

impl AttemptOutcome {
    #[must_use]
    pub fn is_closed(self) -> bool {
        matches!(self, AttemptOutcome::Closed(_))
    }
}
