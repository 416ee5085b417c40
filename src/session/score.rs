use serde::Serialize;

use super::error::SessionError;
use super::state::{Phase, QuizSession};
use crate::models::Label;

/// Outcome for one sampled question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionResult {
    /// Zero-based position within the session.
    pub index: usize,
    pub question_text: String,
    pub user_label: Option<Label>,
    pub correct_label: String,
    pub is_correct: bool,
    pub reference: Option<String>,
    pub clause: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreReport {
    pub total: usize,
    pub correct_count: usize,
    /// Share of correct answers, rounded to one decimal place.
    pub percent: f64,
    pub per_question: Vec<QuestionResult>,
}

fn percent_of(correct: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = correct as f64 / total as f64 * 100.0;
    (raw * 10.0).round() / 10.0
}

/// Scores an ended session. Unanswered questions count as wrong.
pub fn score(session: &QuizSession) -> Result<ScoreReport, SessionError> {
    if session.phase() != Phase::Ended {
        return Err(SessionError::WrongPhase {
            action: "score",
            phase: session.phase(),
        });
    }

    let per_question: Vec<QuestionResult> = session
        .questions()
        .iter()
        .zip(session.answers())
        .enumerate()
        .map(|(index, (question, answer))| QuestionResult {
            index,
            question_text: question.text.clone(),
            user_label: *answer,
            correct_label: question.correct.clone(),
            is_correct: question.is_correct(*answer),
            reference: question.reference.clone(),
            clause: question.clause.clone(),
        })
        .collect();

    let total = per_question.len();
    let correct_count = per_question.iter().filter(|result| result.is_correct).count();
    Ok(ScoreReport {
        total,
        correct_count,
        percent: percent_of(correct_count, total),
        per_question,
    })
}

impl QuizSession {
    pub fn score(&self) -> Result<ScoreReport, SessionError> {
        score(self)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::data::QuestionBank;
    use crate::models::{Question, QuestionOption};
    use crate::session::clock::fixed_clock;
    use crate::session::state::TIME_LIMIT_SECS;

    fn bank(correct: &[&str]) -> QuestionBank {
        let questions = correct
            .iter()
            .enumerate()
            .map(|(i, key)| Question {
                id: i as i64 + 1,
                text: format!("Question {}", i + 1),
                options: Label::ALL[..4]
                    .iter()
                    .map(|label| QuestionOption {
                        label: *label,
                        text: label.to_string(),
                    })
                    .collect(),
                correct: key.to_string(),
                reference: Some(format!("Ref {}", i + 1)),
                clause: None,
            })
            .collect();
        QuestionBank::new(questions)
    }

    /// Plays `answers` positionally over ten questions and submits.
    fn play(correct: &[&str], answers: &[Option<&str>]) -> QuizSession {
        let bank = bank(correct);
        let mut session = QuizSession::with_clock(fixed_clock());
        session
            .start_with_rng(10, &bank, &mut StdRng::seed_from_u64(1))
            .unwrap();

        for position in 0..10 {
            let question = session.current_question().unwrap().clone();
            let id = question.id as usize;
            if let Some(Some(raw)) = answers.get(id - 1) {
                session.record_raw_answer(raw).unwrap();
            }
            if position < 9 {
                session.navigate_next().unwrap();
            }
        }
        session.submit().unwrap();
        session
    }

    #[test]
    fn test_score_requires_ended_session() {
        let session = QuizSession::with_clock(fixed_clock());
        assert!(matches!(
            score(&session),
            Err(SessionError::WrongPhase { phase: Phase::Setup, .. })
        ));
    }

    #[test]
    fn test_answers_compared_case_insensitively() {
        let correct = ["A", "B", "C", "A", "A", "A", "A", "A", "A", "A"];
        let answers = [Some("A"), Some("b"), Some("D")];
        let session = play(&correct, &answers);
        let report = session.score().unwrap();

        assert_eq!(report.total, 10);
        assert_eq!(report.correct_count, 2);
        assert_eq!(report.percent, 20.0);
    }

    #[test]
    fn test_percent_rounds_to_one_decimal() {
        assert_eq!(percent_of(1, 3), 33.3);
        assert_eq!(percent_of(2, 3), 66.7);
        assert_eq!(percent_of(7, 20), 35.0);
        assert_eq!(percent_of(0, 0), 0.0);
    }

    #[test]
    fn test_unanswered_questions_are_wrong() {
        let correct = ["A"; 10];
        let session = play(&correct, &[]);
        let report = session.score().unwrap();
        assert_eq!(report.correct_count, 0);
        assert_eq!(report.percent, 0.0);
        assert!(report.per_question.iter().all(|row| row.user_label.is_none()));
    }

    #[test]
    fn test_per_question_rows_follow_session_order() {
        let correct = ["b"; 10];
        let answers = [Some("B"); 10];
        let session = play(&correct, &answers);
        let report = session.score().unwrap();

        assert_eq!(report.correct_count, 10);
        assert_eq!(report.percent, 100.0);
        for (position, row) in report.per_question.iter().enumerate() {
            assert_eq!(row.index, position);
            assert_eq!(row.question_text, session.questions()[position].text);
            assert!(row.reference.is_some());
        }
    }

    #[test]
    fn test_expired_session_is_scorable() {
        let bank = bank(&["A"; 10]);
        let mut session = QuizSession::with_clock(fixed_clock());
        session
            .start_with_rng(10, &bank, &mut StdRng::seed_from_u64(3))
            .unwrap();
        session.record_answer(Label::A).unwrap();
        session.clock_mut().advance(Duration::seconds(TIME_LIMIT_SECS));
        session.tick();

        let report = session.score().unwrap();
        assert_eq!(report.correct_count, 1);
        assert_eq!(report.percent, 10.0);
    }
}
