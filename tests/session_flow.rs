mod common;

use std::collections::HashSet;

use chrono::Duration;
use exam_drill::session::{fixed_clock, EndReason, Phase, QuizSession, TIME_LIMIT_SECS};
use exam_drill::{load, Label, SessionError};
use rand::rngs::StdRng;
use rand::SeedableRng;

use common::Fixture;

#[test]
fn full_session_from_sheet_to_score() {
    let fixture = Fixture::new();
    let bank = load(fixture.sheet("bank.csv", 60)).unwrap();

    let mut session = QuizSession::with_clock(fixed_clock());
    session
        .start_with_rng(20, &bank, &mut StdRng::seed_from_u64(42))
        .unwrap();

    let ids: HashSet<i64> = session.questions().iter().map(|q| q.id).collect();
    assert_eq!(ids.len(), 20);

    // Every key is B: answer half right, half wrong, leave the last blank.
    for position in 0..20 {
        if position < 10 {
            session.record_raw_answer("b").unwrap();
        } else if position < 19 {
            session.record_answer(Label::A).unwrap();
        }
        if position < 19 {
            session.navigate_next().unwrap();
        }
    }
    session.clock_mut().advance(Duration::minutes(25));
    session.submit().unwrap();

    let report = session.score().unwrap();
    assert_eq!(report.total, 20);
    assert_eq!(report.correct_count, 10);
    assert_eq!(report.percent, 50.0);
    assert_eq!(report.per_question[19].user_label, None);
    assert!(!report.per_question[19].is_correct);
    assert_eq!(session.end_reason(), Some(EndReason::Submitted));
    assert_eq!(session.remaining_seconds(), 35 * 60);

    session.reset().unwrap();
    assert_eq!(session, QuizSession::with_clock(*session.clock()));
}

#[test]
fn timer_expiry_ends_mid_quiz() {
    let fixture = Fixture::new();
    let bank = load(fixture.sheet("bank.csv", 10)).unwrap();

    let mut session = QuizSession::with_clock(fixed_clock());
    session.start(10, &bank).unwrap();
    session.record_answer(Label::B).unwrap();
    session.navigate_next().unwrap();

    session.clock_mut().advance(Duration::seconds(TIME_LIMIT_SECS));
    assert!(matches!(
        session.navigate_next(),
        Err(SessionError::WrongPhase { phase: Phase::Ended, .. })
    ));
    assert_eq!(session.current_index(), 1);
    assert_eq!(session.end_reason(), Some(EndReason::TimeExpired));

    let report = session.score().unwrap();
    assert_eq!(report.correct_count, 1);
}

#[test]
fn small_bank_keeps_session_in_setup() {
    let fixture = Fixture::new();
    let bank = load(fixture.sheet("bank.csv", 49)).unwrap();

    let mut session = QuizSession::with_clock(fixed_clock());
    assert_eq!(
        session.start(50, &bank),
        Err(SessionError::InsufficientQuestions { requested: 50, available: 49 })
    );
    assert_eq!(session.phase(), Phase::Setup);
    session.start(20, &bank).unwrap();
    assert_eq!(session.requested_count(), 20);
}
