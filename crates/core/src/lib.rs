#![forbid(unsafe_code)]
//! Scoring and progression engine for the geometry exercises.
//!
//! Exercises feed attempts into a [`TaskSession`]; the final score goes to a
//! [`ProgressRegistry`], which tracks unlocks and the learner's level.

pub mod error;
pub mod model;
pub mod progress;
pub mod scoring;
pub mod session;
pub mod settings;
pub mod time;

pub use error::Error;
pub use progress::{ProgressRegistry, ProgressSnapshot, TaskLocked};
pub use session::{InvalidAttempt, TaskSession};
pub use settings::ProgressionSettings;
pub use time::Clock;
