mod question;

pub use question::{Label, ParseLabelError, Question, QuestionOption};
