//! # exam-drill
//!
//! A timed multiple-choice exam trainer for the terminal.
//!
//! Questions come from a question spreadsheet (xlsx, xls, ods) or a CSV or
//! JSON export of one. A session samples 10, 20 or 50 of them, gives the
//! user 60 minutes to work through them in any order, and scores the
//! answers at the end.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use exam_drill::{Quiz, QuizError};
//!
//! fn main() -> Result<(), QuizError> {
//!     let quiz = Quiz::from_path("questions.csv")?;
//!     quiz.run()?;
//!     Ok(())
//! }
//! ```
//!
//! The session can also be driven without a terminal:
//!
//! ```rust,no_run
//! use exam_drill::data::load_cached;
//! use exam_drill::session::QuizSession;
//!
//! let bank = load_cached("questions.csv").unwrap();
//! let mut session = QuizSession::new();
//! session.start(10, &bank).unwrap();
//! ```

mod app;
pub mod data;
pub mod models;
pub mod session;
pub mod terminal;
mod ui;

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use tracing::info;

pub use app::App;
pub use data::{load, load_cached, DataFormatError, QuestionBank};
pub use models::{Label, Question, QuestionOption};
pub use session::{Phase, QuizSession, ScoreReport, SessionError};

/// How long the event loop waits for input before redrawing the timer.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Error type for quiz operations.
#[derive(Debug, thiserror::Error)]
pub enum QuizError {
    #[error("failed to load questions: {0}")]
    Load(#[from] DataFormatError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// A quiz instance that can be run in the terminal.
pub struct Quiz {
    app: App,
}

impl Quiz {
    pub fn new(bank: Arc<QuestionBank>) -> Self {
        Self { app: App::new(bank) }
    }

    /// Load the question bank (once per process) and build a quiz over it.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use exam_drill::Quiz;
    ///
    /// let quiz = Quiz::from_path("questions.csv").expect("Failed to load quiz");
    /// ```
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, QuizError> {
        let bank = load_cached(path)?;
        Ok(Self::new(bank))
    }

    /// Run the quiz in the terminal until the user quits.
    pub fn run(mut self) -> Result<(), QuizError> {
        let mut term = terminal::TerminalSession::enter()?;
        run_event_loop(&mut term, &mut self.app)
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }
}

fn run_event_loop(term: &mut terminal::TerminalSession, app: &mut App) -> Result<(), QuizError> {
    info!("entering terminal ui");
    loop {
        app.refresh();
        term.draw(|frame| ui::render(frame, app))?;

        if !event::poll(POLL_INTERVAL)? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }

            app.refresh();
            if handle_input(app, key.code) {
                break;
            }
        }
    }

    info!("leaving terminal ui");
    Ok(())
}

/// Returns true if the app should exit.
fn handle_input(app: &mut App, key: KeyCode) -> bool {
    if matches!(key, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc) {
        return true;
    }

    match app.phase() {
        Phase::Setup => handle_setup_input(app, key),
        Phase::InProgress => handle_quiz_input(app, key),
        Phase::Ended => handle_result_input(app, key),
    }
    false
}

fn handle_setup_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Left | KeyCode::Char('h') => app.select_previous_length(),
        KeyCode::Right | KeyCode::Char('l') => app.select_next_length(),
        KeyCode::Enter => app.start_quiz(),
        _ => {}
    }
}

fn handle_quiz_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Up | KeyCode::Char('k') => app.select_previous_option(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next_option(),
        KeyCode::Enter | KeyCode::Char(' ') => app.answer_selected(),
        KeyCode::Left | KeyCode::Char('h') => app.previous_question(),
        KeyCode::Right | KeyCode::Char('l') => app.next_question(),
        KeyCode::Char('s') | KeyCode::Char('S') => app.submit(),
        KeyCode::Char(c) => {
            if let Some(label) = Label::from_char(c) {
                app.answer(label);
            }
        }
        _ => {}
    }
}

fn handle_result_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Down | KeyCode::Char('j') => app.scroll_results_down(),
        KeyCode::Up | KeyCode::Char('k') => app.scroll_results_up(),
        KeyCode::Char('r') | KeyCode::Char('R') => app.restart(),
        _ => {}
    }
}
