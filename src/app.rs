use std::sync::Arc;

use tracing::warn;

use crate::data::QuestionBank;
use crate::models::{Label, Question};
use crate::session::{Phase, QuizLength, QuizSession, ScoreReport, SessionError, SessionSnapshot};

/// Screen-level controller: owns the session and the cursors the views need.
pub struct App {
    bank: Arc<QuestionBank>,
    session: QuizSession,
    snapshot: SessionSnapshot,
    selected_length: usize,
    cursor: usize,
    result_scroll: usize,
    report: Option<ScoreReport>,
    message: Option<String>,
}

impl App {
    pub fn new(bank: Arc<QuestionBank>) -> Self {
        Self::with_session(bank, QuizSession::new())
    }

    pub fn with_session(bank: Arc<QuestionBank>, mut session: QuizSession) -> Self {
        let snapshot = session.snapshot();
        Self {
            bank,
            session,
            snapshot,
            selected_length: 0,
            cursor: 0,
            result_scroll: 0,
            report: None,
            message: None,
        }
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut QuizSession {
        &mut self.session
    }

    /// Session state as of the last [`App::refresh`]; the views draw from this.
    pub fn snapshot(&self) -> &SessionSnapshot {
        &self.snapshot
    }

    pub fn phase(&self) -> Phase {
        self.snapshot.phase
    }

    /// Last rejected action, shown until the next successful one.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn report(&self) -> Option<&ScoreReport> {
        self.report.as_ref()
    }

    pub fn selected_length(&self) -> QuizLength {
        QuizLength::ALL[self.selected_length]
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn result_scroll(&self) -> usize {
        self.result_scroll
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.session.current_question()
    }

    /// Runs the expiry check and retakes the snapshot; call before every frame.
    pub fn refresh(&mut self) {
        self.snapshot = self.session.snapshot();
        if self.snapshot.phase == Phase::Ended && self.report.is_none() {
            self.report = self.session.score().ok();
            self.result_scroll = 0;
        }
    }

    pub fn select_next_length(&mut self) {
        self.selected_length = (self.selected_length + 1) % QuizLength::ALL.len();
    }

    pub fn select_previous_length(&mut self) {
        let len = QuizLength::ALL.len();
        self.selected_length = (self.selected_length + len - 1) % len;
    }

    pub fn start_quiz(&mut self) {
        let count = self.selected_length().count();
        let result = self.session.start(count, &self.bank);
        self.cursor = 0;
        self.apply(result);
    }

    pub fn select_next_option(&mut self) {
        let options = self.option_count();
        if options > 0 {
            self.cursor = (self.cursor + 1) % options;
        }
    }

    pub fn select_previous_option(&mut self) {
        let options = self.option_count();
        if options > 0 {
            self.cursor = (self.cursor + options - 1) % options;
        }
    }

    /// Records the option under the cursor.
    pub fn answer_selected(&mut self) {
        let label = self
            .current_question()
            .and_then(|question| question.options.get(self.cursor))
            .map(|option| option.label);
        if let Some(label) = label {
            self.answer(label);
        }
    }

    pub fn answer(&mut self, label: Label) {
        let result = self.session.record_answer(label);
        if result.is_ok() {
            self.sync_cursor();
        }
        self.apply(result);
    }

    pub fn previous_question(&mut self) {
        let result = self.session.navigate_previous();
        self.sync_cursor();
        self.apply(result);
    }

    pub fn next_question(&mut self) {
        let result = self.session.navigate_next();
        self.sync_cursor();
        self.apply(result);
    }

    pub fn submit(&mut self) {
        let result = self.session.submit();
        self.apply(result);
    }

    pub fn scroll_results_down(&mut self) {
        let rows = self.report.as_ref().map_or(0, |report| report.per_question.len());
        if self.result_scroll + 1 < rows {
            self.result_scroll += 1;
        }
    }

    pub fn scroll_results_up(&mut self) {
        self.result_scroll = self.result_scroll.saturating_sub(1);
    }

    pub fn restart(&mut self) {
        let result = self.session.reset();
        if result.is_ok() {
            self.report = None;
            self.cursor = 0;
            self.result_scroll = 0;
        }
        self.apply(result);
    }

    fn option_count(&self) -> usize {
        self.current_question().map_or(0, |question| question.options.len())
    }

    /// Places the cursor on the recorded answer, or the first option.
    fn sync_cursor(&mut self) {
        let answer = self.session.current_answer();
        self.cursor = self
            .current_question()
            .and_then(|question| {
                answer.and_then(|label| question.labels().position(|l| l == label))
            })
            .unwrap_or(0);
    }

    fn apply(&mut self, result: Result<(), SessionError>) {
        match result {
            Ok(()) => self.message = None,
            Err(err) => {
                warn!(error = %err, "action rejected");
                self.message = Some(err.to_string());
            }
        }
        self.refresh();
    }
}
