use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

//
// ─── TIER ──────────────────────────────────────────────────────────────────────
//

/// Grouping of tasks used by the unlock gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Basic,
    Advanced,
}

//
// ─── TASK ID ───────────────────────────────────────────────────────────────────
//

/// Identifier of one exercise module.
///
/// The set is closed: every task the engine knows about is listed here, and
/// tier membership is fixed at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskId {
    #[serde(rename = "shape_recognition_2d")]
    ShapeRecognition2D,
    #[serde(rename = "shape_recognition_3d")]
    ShapeRecognition3D,
    AngleClassification,
    AreaCalculation,
    CircleCalculation,
    CompoundShapeArea,
    SectorCalculation,
}

impl TaskId {
    /// Number of known tasks.
    pub const COUNT: usize = 7;

    /// Every known task, basic tier first.
    pub const ALL: [TaskId; Self::COUNT] = [
        TaskId::ShapeRecognition2D,
        TaskId::ShapeRecognition3D,
        TaskId::AngleClassification,
        TaskId::AreaCalculation,
        TaskId::CircleCalculation,
        TaskId::CompoundShapeArea,
        TaskId::SectorCalculation,
    ];

    #[must_use]
    pub const fn tier(self) -> Tier {
        match self {
            TaskId::ShapeRecognition2D
            | TaskId::ShapeRecognition3D
            | TaskId::AngleClassification
            | TaskId::AreaCalculation
            | TaskId::CircleCalculation => Tier::Basic,
            TaskId::CompoundShapeArea | TaskId::SectorCalculation => Tier::Advanced,
        }
    }

    #[must_use]
    pub fn is_basic(self) -> bool {
        self.tier() == Tier::Basic
    }

    #[must_use]
    pub fn is_advanced(self) -> bool {
        self.tier() == Tier::Advanced
    }

    /// Tasks in the basic tier.
    pub fn basic() -> impl Iterator<Item = TaskId> {
        Self::ALL.into_iter().filter(|id| id.is_basic())
    }

    /// Tasks in the advanced tier.
    pub fn advanced() -> impl Iterator<Item = TaskId> {
        Self::ALL.into_iter().filter(|id| id.is_advanced())
    }

    /// Position of this task within `ALL`.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            TaskId::ShapeRecognition2D => 0,
            TaskId::ShapeRecognition3D => 1,
            TaskId::AngleClassification => 2,
            TaskId::AreaCalculation => 3,
            TaskId::CircleCalculation => 4,
            TaskId::CompoundShapeArea => 5,
            TaskId::SectorCalculation => 6,
        }
    }

    /// Stable string form used by storage and exports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            TaskId::ShapeRecognition2D => "shape_recognition_2d",
            TaskId::ShapeRecognition3D => "shape_recognition_3d",
            TaskId::AngleClassification => "angle_classification",
            TaskId::AreaCalculation => "area_calculation",
            TaskId::CircleCalculation => "circle_calculation",
            TaskId::CompoundShapeArea => "compound_shape_area",
            TaskId::SectorCalculation => "sector_calculation",
        }
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a known task.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown task id: {raw}")]
pub struct ParseTaskIdError {
    raw: String,
}

impl ParseTaskIdError {
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

impl FromStr for TaskId {
    type Err = ParseTaskIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| ParseTaskIdError { raw: s.to_string() })
    }
}

//
// ─── SESSION ID ────────────────────────────────────────────────────────────────
//

/// Unique identifier for one `TaskSession` instance.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generates a fresh random id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId({})", self.0)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_are_partitioned() {
        let basic: Vec<_> = TaskId::basic().collect();
        let advanced: Vec<_> = TaskId::advanced().collect();
        assert_eq!(basic.len(), 5);
        assert_eq!(
            advanced,
            vec![TaskId::CompoundShapeArea, TaskId::SectorCalculation]
        );
    }

    #[test]
    fn index_matches_position_in_all() {
        for (pos, id) in TaskId::ALL.into_iter().enumerate() {
            assert_eq!(id.index(), pos);
        }
    }

    #[test]
    fn task_id_display_and_parse_agree() {
        for id in TaskId::ALL {
            let parsed: TaskId = id.to_string().parse().unwrap();
            assert_eq!(parsed, id);
        }
    }

    #[test]
    fn unknown_task_id_is_rejected() {
        let err = "triangle_trivia".parse::<TaskId>().unwrap_err();
        assert_eq!(err.raw(), "triangle_trivia");
    }

    #[test]
    fn serde_name_matches_display() {
        let json = serde_json::to_string(&TaskId::ShapeRecognition3D).unwrap();
        assert_eq!(json, "\"shape_recognition_3d\"");
    }

    #[test]
    fn session_id_from_str() {
        let id = SessionId::generate();
        let parsed: SessionId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }
}
