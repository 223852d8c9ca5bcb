mod state;
mod workflow;

pub use crate::error::ExerciseError;
pub use state::Exercise;
pub use workflow::{ExerciseAnswer, ExerciseLoopService};
