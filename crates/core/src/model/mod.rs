mod attempt;
mod ids;
mod level;
mod result;
mod task;

pub use attempt::{
    AttemptOutcome, Category, CategoryError, Ordinal, QuestionKey, QuestionOutcome,
};
pub use ids::{ParseTaskIdError, SessionId, TaskId, Tier};
pub use level::{ParseUserLevelError, UserLevel};
pub use result::{TaskResult, TaskResultError};
pub use task::{
    CompletionRule, ParseStatusError, Score, ScoreError, ScoreMode, TaskConfig, TaskRecord,
    TaskStatus,
};
