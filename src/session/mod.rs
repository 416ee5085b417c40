//! Quiz session state machine, time source and scoring.

mod clock;
mod error;
mod score;
mod state;

pub use clock::{fixed_clock, Clock, FIXED_TEST_TIMESTAMP};
pub use error::SessionError;
pub use score::{score, QuestionResult, ScoreReport};
pub use state::{EndReason, Phase, QuizLength, QuizSession, SessionSnapshot, TIME_LIMIT_SECS};
