//! Quiz session lifecycle.
//!
//! A session moves `Setup -> InProgress -> Ended` and returns to `Setup`
//! only through [`QuizSession::reset`]. The time limit is checked by
//! comparing the clock against the start instant whenever the session is
//! read through [`QuizSession::snapshot`] or asked to change; there is no
//! background timer.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use rand::seq::index;
use rand::Rng;
use tracing::{debug, info};

use super::clock::Clock;
use super::error::SessionError;
use crate::data::QuestionBank;
use crate::models::{Label, Question};

/// Fixed time budget for one session.
pub const TIME_LIMIT_SECS: i64 = 3600;

/// Quiz lengths offered on the setup screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuizLength {
    #[default]
    Ten,
    Twenty,
    Fifty,
}

impl QuizLength {
    pub const ALL: [QuizLength; 3] = [QuizLength::Ten, QuizLength::Twenty, QuizLength::Fifty];

    pub fn count(self) -> usize {
        match self {
            QuizLength::Ten => 10,
            QuizLength::Twenty => 20,
            QuizLength::Fifty => 50,
        }
    }
}

impl TryFrom<usize> for QuizLength {
    type Error = SessionError;

    fn try_from(requested: usize) -> Result<Self, Self::Error> {
        QuizLength::ALL
            .into_iter()
            .find(|length| length.count() == requested)
            .ok_or(SessionError::InvalidConfiguration { requested })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Setup,
    InProgress,
    Ended,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Setup => f.write_str("not started"),
            Phase::InProgress => f.write_str("in progress"),
            Phase::Ended => f.write_str("over"),
        }
    }
}

/// Why a session left `InProgress`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    Submitted,
    TimeExpired,
}

/// What the view needs to draw one frame, taken after the expiry check.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub end_reason: Option<EndReason>,
    pub current_index: usize,
    pub requested_count: usize,
    pub current_question: Option<Question>,
    pub answers: Vec<Option<Label>>,
    pub remaining_seconds: u64,
}

impl SessionSnapshot {
    pub fn current_answer(&self) -> Option<Label> {
        self.answers.get(self.current_index).copied().flatten()
    }

    pub fn is_last_question(&self) -> bool {
        self.requested_count > 0 && self.current_index + 1 == self.requested_count
    }
}

/// One user's attempt at a quiz.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizSession {
    phase: Phase,
    length: Option<QuizLength>,
    questions: Vec<Question>,
    answers: Vec<Option<Label>>,
    current_index: usize,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    end_reason: Option<EndReason>,
    clock: Clock,
}

impl QuizSession {
    pub fn new() -> Self {
        Self::with_clock(Clock::default())
    }

    pub fn with_clock(clock: Clock) -> Self {
        Self {
            phase: Phase::Setup,
            length: None,
            questions: Vec::new(),
            answers: Vec::new(),
            current_index: 0,
            started_at: None,
            ended_at: None,
            end_reason: None,
            clock,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn length(&self) -> Option<QuizLength> {
        self.length
    }

    /// Number of sampled questions; zero before a quiz starts.
    pub fn requested_count(&self) -> usize {
        self.questions.len()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &[Option<Label>] {
        &self.answers
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    pub fn current_answer(&self) -> Option<Label> {
        self.answers.get(self.current_index).copied().flatten()
    }

    pub fn is_last_question(&self) -> bool {
        self.current_index + 1 == self.questions.len()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        self.end_reason
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    /// Time left, clamped at zero. Frozen once the session has ended.
    pub fn remaining(&self) -> Duration {
        let limit = Duration::seconds(TIME_LIMIT_SECS);
        let Some(started_at) = self.started_at else {
            return limit;
        };
        let until = self.ended_at.unwrap_or_else(|| self.clock.now());
        (limit - (until - started_at)).max(Duration::zero())
    }

    pub fn remaining_seconds(&self) -> u64 {
        u64::try_from(self.remaining().num_seconds()).unwrap_or(0)
    }

    /// Ends an in-progress session whose time budget is spent.
    ///
    /// Returns true if this call ended the session.
    pub fn tick(&mut self) -> bool {
        let Some(started_at) = self.started_at else {
            return false;
        };
        if self.phase != Phase::InProgress {
            return false;
        }

        let now = self.clock.now();
        if now - started_at < Duration::seconds(TIME_LIMIT_SECS) {
            return false;
        }

        info!(answered = self.answered_count(), "time limit reached");
        self.finish(EndReason::TimeExpired, started_at + Duration::seconds(TIME_LIMIT_SECS));
        true
    }

    /// Runs the expiry check and returns the view's read model.
    pub fn snapshot(&mut self) -> SessionSnapshot {
        self.tick();
        SessionSnapshot {
            phase: self.phase,
            end_reason: self.end_reason,
            current_index: self.current_index,
            requested_count: self.questions.len(),
            current_question: self.questions.get(self.current_index).cloned(),
            answers: self.answers.clone(),
            remaining_seconds: self.remaining_seconds(),
        }
    }

    /// Starts a quiz using the thread-local random generator.
    pub fn start(&mut self, requested: usize, bank: &QuestionBank) -> Result<(), SessionError> {
        self.start_with_rng(requested, bank, &mut rand::rng())
    }

    /// Samples `requested` distinct questions from the bank and starts the timer.
    pub fn start_with_rng<R: Rng + ?Sized>(
        &mut self,
        requested: usize,
        bank: &QuestionBank,
        rng: &mut R,
    ) -> Result<(), SessionError> {
        self.expect_phase(Phase::Setup, "start a quiz")?;
        let length = QuizLength::try_from(requested)?;
        if bank.len() < requested {
            return Err(SessionError::InsufficientQuestions {
                requested,
                available: bank.len(),
            });
        }

        self.questions = index::sample(rng, bank.len(), requested)
            .into_iter()
            .filter_map(|position| bank.get(position).cloned())
            .collect();
        self.answers = vec![None; requested];
        self.length = Some(length);
        self.current_index = 0;
        self.started_at = Some(self.clock.now());
        self.ended_at = None;
        self.end_reason = None;
        self.phase = Phase::InProgress;

        info!(questions = requested, bank = bank.len(), "quiz started");
        Ok(())
    }

    /// Records an answer for the current question.
    pub fn record_answer(&mut self, label: Label) -> Result<(), SessionError> {
        self.expect_in_progress("answer")?;
        let position = self.current_index;
        let offered = self
            .current_question()
            .is_some_and(|question| question.has_option(label));
        if !offered {
            return Err(SessionError::InvalidAnswer {
                label: label.to_string(),
                position: position + 1,
            });
        }

        self.answers[position] = Some(label);
        debug!(position = position + 1, %label, "answer recorded");
        Ok(())
    }

    /// Parses a raw label (case-insensitive, trimmed) and records it.
    pub fn record_raw_answer(&mut self, raw: &str) -> Result<(), SessionError> {
        match raw.parse::<Label>() {
            Ok(label) => self.record_answer(label),
            Err(_) => {
                self.expect_in_progress("answer")?;
                Err(SessionError::InvalidAnswer {
                    label: raw.to_string(),
                    position: self.current_index + 1,
                })
            }
        }
    }

    pub fn navigate_previous(&mut self) -> Result<(), SessionError> {
        self.expect_in_progress("go back")?;
        if self.current_index == 0 {
            return Err(SessionError::OutOfRange {
                direction: "back",
                position: 1,
                total: self.questions.len(),
            });
        }

        self.current_index -= 1;
        debug!(position = self.current_index + 1, "moved to previous question");
        Ok(())
    }

    pub fn navigate_next(&mut self) -> Result<(), SessionError> {
        self.expect_in_progress("go forward")?;
        if self.is_last_question() {
            return Err(SessionError::OutOfRange {
                direction: "forward",
                position: self.current_index + 1,
                total: self.questions.len(),
            });
        }

        self.current_index += 1;
        debug!(position = self.current_index + 1, "moved to next question");
        Ok(())
    }

    /// Hands the quiz in. Only allowed from the last question.
    pub fn submit(&mut self) -> Result<(), SessionError> {
        self.expect_in_progress("submit")?;
        if !self.is_last_question() {
            return Err(SessionError::NotLastQuestion {
                position: self.current_index + 1,
                total: self.questions.len(),
            });
        }

        info!(answered = self.answered_count(), total = self.questions.len(), "quiz submitted");
        let now = self.clock.now();
        self.finish(EndReason::Submitted, now);
        Ok(())
    }

    /// Discards an ended session and returns to setup.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        self.tick();
        self.expect_phase(Phase::Ended, "restart")?;
        *self = Self::with_clock(self.clock);
        info!("session reset");
        Ok(())
    }

    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|answer| answer.is_some()).count()
    }

    fn finish(&mut self, reason: EndReason, at: DateTime<Utc>) {
        self.phase = Phase::Ended;
        self.end_reason = Some(reason);
        self.ended_at = Some(at);
    }

    fn expect_in_progress(&mut self, action: &'static str) -> Result<(), SessionError> {
        self.tick();
        self.expect_phase(Phase::InProgress, action)
    }

    fn expect_phase(&self, expected: Phase, action: &'static str) -> Result<(), SessionError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(SessionError::WrongPhase {
                action,
                phase: self.phase,
            })
        }
    }
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new()
    }
}
