//! Quiz session state machine and its result types.

mod options;
mod session;

use serde::Serialize;

pub use options::{QuizOptions, ValidOptions, DEFAULT_DIFFICULTY, DEFAULT_LENGTH};
pub use session::QuizSession;

/// Lifecycle of a [`QuizSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionState {
    /// Options may still change; nothing has been filtered.
    Configuring,
    /// The play sequence is fixed; no turn has started.
    Filtered,
    /// At least one turn has started and species remain or await an answer.
    InProgress,
    /// Every species in the sequence has been visited.
    Completed,
}

/// One graded answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerRecord {
    /// What the user typed, normalized.
    pub submitted: String,
    /// Primary, alternate and scientific names, in that order.
    pub canonical_answers: Vec<String>,
    pub correct: bool,
}

/// Outcome of a single `submit_answer` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub correct: bool,
    /// Primary common name, for feedback.
    pub answer: String,
}

/// Final tally for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Score {
    pub correct: usize,
    pub incorrect: usize,
    /// `correct / turns * 100`, rounded down.
    pub percent: u32,
}

impl Score {
    /// Tally `correct` right answers out of `turns`. `None` when no turn was played.
    pub fn from_counts(correct: usize, turns: usize) -> Option<Self> {
        if turns == 0 {
            return None;
        }
        Some(Self {
            correct,
            incorrect: turns - correct,
            percent: (correct * 100 / turns) as u32,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_rounds_down() {
        assert_eq!(
            Score::from_counts(3, 10),
            Some(Score {
                correct: 3,
                incorrect: 7,
                percent: 30
            })
        );
        assert_eq!(Score::from_counts(2, 3).unwrap().percent, 66);
        assert_eq!(Score::from_counts(0, 4).unwrap().percent, 0);
        assert_eq!(Score::from_counts(0, 0), None);
    }
}
