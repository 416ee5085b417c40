use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Identifier of an answer option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Label {
    A,
    B,
    C,
    D,
    E,
}

impl Label {
    /// All labels in declaration order.
    pub const ALL: [Label; 5] = [Label::A, Label::B, Label::C, Label::D, Label::E];

    pub fn as_str(self) -> &'static str {
        match self {
            Label::A => "A",
            Label::B => "B",
            Label::C => "C",
            Label::D => "D",
            Label::E => "E",
        }
    }

    /// Maps a key press (`a`..`e`, either case) to a label.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(Label::A),
            'B' => Some(Label::B),
            'C' => Some(Label::C),
            'D' => Some(Label::D),
            'E' => Some(Label::E),
            _ => None,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a single A-E letter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not an option label (expected A-E)")]
pub struct ParseLabelError(pub String);

impl FromStr for Label {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Label::from_char(c).ok_or_else(|| ParseLabelError(s.to_string())),
            _ => Err(ParseLabelError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionOption {
    pub label: Label,
    pub text: String,
}

/// A single multiple-choice question from the bank.
///
/// Options keep their A-E order and absent options are omitted. The
/// correct label is stored as loaded (trimmed, uppercased) and is not
/// guaranteed to name a present option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    pub id: i64,
    pub text: String,
    pub options: Vec<QuestionOption>,
    pub correct: String,
    pub reference: Option<String>,
    pub clause: Option<String>,
}

impl Question {
    pub fn labels(&self) -> impl Iterator<Item = Label> + '_ {
        self.options.iter().map(|option| option.label)
    }

    pub fn has_option(&self, label: Label) -> bool {
        self.labels().any(|l| l == label)
    }

    pub fn option_text(&self, label: Label) -> Option<&str> {
        self.options
            .iter()
            .find(|option| option.label == label)
            .map(|option| option.text.as_str())
    }

    /// The correct answer as a label, if it parses and names a present option.
    pub fn correct_label(&self) -> Option<Label> {
        self.correct
            .parse::<Label>()
            .ok()
            .filter(|label| self.has_option(*label))
    }

    /// Case-insensitive, whitespace-trimmed comparison against the key.
    pub fn is_correct(&self, answer: Option<Label>) -> bool {
        answer.is_some_and(|label| label.as_str().eq_ignore_ascii_case(self.correct.trim()))
    }
}
