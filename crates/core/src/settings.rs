//! Tunable thresholds for unlocking and levelling.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("unlock threshold must be within 0..=100, got {0}")]
    InvalidUnlockThreshold(u32),

    #[error("level thresholds must not decrease from intermediate to expert")]
    UnorderedLevels,
}

/// Minimum total score and completed-task count for one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelRequirement {
    pub total_score: u32,
    pub completed: u32,
}

impl LevelRequirement {
    #[must_use]
    pub const fn new(total_score: u32, completed: u32) -> Self {
        Self {
            total_score,
            completed,
        }
    }

    #[must_use]
    pub fn is_met(&self, total_score: u32, completed: u32) -> bool {
        total_score >= self.total_score && completed >= self.completed
    }

    fn dominates(&self, other: &Self) -> bool {
        self.total_score >= other.total_score && self.completed >= other.completed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelThresholds {
    pub expert: LevelRequirement,
    pub advanced: LevelRequirement,
    pub intermediate: LevelRequirement,
}

impl Default for LevelThresholds {
    fn default() -> Self {
        Self {
            expert: LevelRequirement::new(540, 6),
            advanced: LevelRequirement::new(420, 5),
            intermediate: LevelRequirement::new(300, 4),
        }
    }
}

/// Settings consumed by `ProgressRegistry`.
///
/// Deserializes with defaults for any missing field, so an empty TOML
/// document yields the stock configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionSettings {
    /// Best score every basic task needs before the advanced tier opens.
    pub unlock_threshold: u32,
    pub levels: LevelThresholds,
}

impl Default for ProgressionSettings {
    fn default() -> Self {
        Self {
            unlock_threshold: 70,
            levels: LevelThresholds::default(),
        }
    }
}

impl ProgressionSettings {
    /// # Errors
    ///
    /// Returns `SettingsError` if the threshold exceeds 100 or a higher level
    /// asks for less than the one below it.
    pub fn validate(self) -> Result<Self, SettingsError> {
        if self.unlock_threshold > 100 {
            return Err(SettingsError::InvalidUnlockThreshold(self.unlock_threshold));
        }
        let levels = &self.levels;
        if !levels.expert.dominates(&levels.advanced)
            || !levels.advanced.dominates(&levels.intermediate)
        {
            return Err(SettingsError::UnorderedLevels);
        }
        Ok(self)
    }
}
