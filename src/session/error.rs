use super::state::Phase;

/// A rejected session transition. The session is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("quiz length must be 10, 20 or 50 (got {requested})")]
    InvalidConfiguration { requested: usize },

    #[error("only {available} questions are available, {requested} requested")]
    InsufficientQuestions { requested: usize, available: usize },

    #[error("'{label}' is not an option of question {position}")]
    InvalidAnswer { label: String, position: usize },

    #[error("cannot go {direction} from question {position} of {total}")]
    OutOfRange {
        direction: &'static str,
        position: usize,
        total: usize,
    },

    #[error("cannot {action}: the quiz is {phase}")]
    WrongPhase { action: &'static str, phase: Phase },

    #[error("submit from the last question (currently on {position} of {total})")]
    NotLastQuestion { position: usize, total: usize },
}
