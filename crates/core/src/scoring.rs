//! Attempt-based scoring rule shared by every exercise.

use crate::model::QuestionOutcome;

/// Hard cap on attempts per question.
pub const MAX_ATTEMPTS: u8 = 3;

/// Points available for a question solved on the first attempt.
pub const MAX_POINTS_PER_QUESTION: u32 = 3;

/// Points awarded for solving a question on the given attempt.
///
/// First attempt earns 3, second 2, third 1. Anything outside `1..=3` earns 0.
///
/// ```
/// # use mastery_core::scoring::points_for;
/// assert_eq!(points_for(1), 3);
/// assert_eq!(points_for(3), 1);
/// assert_eq!(points_for(4), 0);
/// ```
#[must_use]
pub const fn points_for(ordinal: u8) -> u32 {
    match ordinal {
        1 => 3,
        2 => 2,
        3 => 1,
        _ => 0,
    }
}

/// Points for a closed question.
#[must_use]
pub fn points_for_outcome(outcome: QuestionOutcome) -> u32 {
    match outcome {
        QuestionOutcome::Solved(ordinal) => points_for(ordinal.get()),
        QuestionOutcome::Unsolved => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Ordinal;

    #[test]
    fn points_diminish_with_each_attempt() {
        for o in 1..=3u8 {
            assert_eq!(points_for(o), 4 - u32::from(o));
        }
    }

    #[test]
    fn out_of_range_ordinals_score_nothing() {
        assert_eq!(points_for(0), 0);
        assert_eq!(points_for(4), 0);
        assert_eq!(points_for(u8::MAX), 0);
    }

    #[test]
    fn unsolved_scores_nothing() {
        assert_eq!(points_for_outcome(QuestionOutcome::Unsolved), 0);
        let second = Ordinal::new(2).unwrap();
        assert_eq!(points_for_outcome(QuestionOutcome::Solved(second)), 2);
    }
}
