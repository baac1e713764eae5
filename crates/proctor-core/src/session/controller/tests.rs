use super::*;
use crate::config::QuestionRules;
use crate::integrity::RiskLevel;
use crate::question::sample_question;
use crate::testing::verdict;

fn controller(correct: &[usize]) -> SessionController {
    let questions = QuestionSet::new(
        correct.iter().map(|&c| sample_question(c)).collect(),
        &QuestionRules::any_count(),
    )
    .unwrap();
    SessionController::new(questions, &EngineConfig::default()).unwrap()
}

fn active(correct: &[usize]) -> SessionController {
    let mut controller = controller(correct);
    controller.begin_start().unwrap();
    controller.activate(true).unwrap();
    controller
}

#[test]
fn test_lifecycle_reaches_completed() {
    let mut c = controller(&[1, 2]);
    assert_eq!(c.status(), SessionStatus::Idle);
    c.begin_start().unwrap();
    assert_eq!(c.status(), SessionStatus::EnteringFullscreen);
    let notices = c.activate(true).unwrap();
    assert_eq!(notices, vec![Notice::SessionStarted]);
    assert_eq!(c.status(), SessionStatus::Active);

    assert!(c.submit_answer(0, 1).unwrap());
    assert_eq!(
        c.advance(0, AdvanceTrigger::User).unwrap(),
        Transition::NextQuestion { index: 1 }
    );
    assert!(c.submit_answer(1, 0).unwrap());
    let Transition::Finished(result) = c.advance(1, AdvanceTrigger::User).unwrap() else {
        panic!("expected the session to finish");
    };
    assert!((result.mcq_score - 0.5).abs() < 1e-9);
    assert_eq!(c.status(), SessionStatus::Completed);
    assert_eq!(c.result(), Some(result));
}

#[test]
fn test_fullscreen_denial_adds_notice_only() {
    let mut c = controller(&[0]);
    c.begin_start().unwrap();
    let notices = c.activate(false).unwrap();
    assert!(notices.contains(&Notice::FullscreenUnavailable));
    assert_eq!(c.status(), SessionStatus::Active);
}

#[test]
fn test_start_twice_is_invalid() {
    let mut c = controller(&[0]);
    c.begin_start().unwrap();
    assert!(matches!(
        c.begin_start(),
        Err(ProctorError::InvalidState {
            operation: "start",
            ..
        })
    ));
}

#[test]
fn test_submit_before_active_is_invalid() {
    let mut c = controller(&[0]);
    assert!(c.submit_answer(0, 0).is_err());
    assert!(c.advance(0, AdvanceTrigger::User).is_err());
}

#[test]
fn test_user_advance_without_answer_is_rejected_without_change() {
    let mut c = active(&[0, 1]);
    let err = c.advance(0, AdvanceTrigger::User).unwrap_err();
    assert!(matches!(err, ProctorError::UserInput(_)));
    assert_eq!(err.to_string(), "Please select an answer before proceeding");
    assert_eq!(c.current_question_index(), 0);
    assert_eq!(c.session().scored_questions(), 0);
}

#[test]
fn test_timer_advance_scores_unanswered_as_incorrect() {
    let mut c = active(&[0, 1]);
    assert_eq!(
        c.timer_expired(0).unwrap(),
        Transition::NextQuestion { index: 1 }
    );
    assert_eq!(c.session().scored_questions(), 1);
    assert_eq!(c.session().correct_answers(), 0);
    assert_eq!(c.session().remaining_secs(), 60);
}

#[test]
fn test_timer_wins_over_late_submission() {
    let mut c = active(&[2, 3]);
    c.timer_expired(0).unwrap();

    // Issued for question 0, arrives after its timer fired
    assert!(!c.submit_answer(0, 2).unwrap());
    assert_eq!(c.advance(0, AdvanceTrigger::User).unwrap(), Transition::Ignored);
    assert_eq!(c.session().answers()[0], None);
    assert_eq!(c.current_question_index(), 1);
}

#[test]
fn test_finalization_happens_once() {
    let mut c = active(&[0]);
    c.submit_answer(0, 0).unwrap();

    let first = c.timer_expired(0).unwrap();
    let second = c.advance(0, AdvanceTrigger::User).unwrap();
    let third = c.timer_expired(0).unwrap();

    assert!(matches!(first, Transition::Finished(_)));
    assert_eq!(second, Transition::Ignored);
    assert_eq!(third, Transition::Ignored);
    assert_eq!(c.session().scored_questions(), 1);
}

#[test]
fn test_invalid_option_is_user_error() {
    let mut c = active(&[0]);
    assert!(matches!(
        c.submit_answer(0, OPTION_COUNT),
        Err(ProctorError::UserInput(_))
    ));
    assert_eq!(c.session().selected(), None);
}

#[test]
fn test_abort_is_terminal_and_idempotent() {
    let mut c = active(&[0, 1]);
    assert!(c.abort());
    assert!(!c.abort());
    assert_eq!(c.status(), SessionStatus::Aborted);
    assert_eq!(c.result(), None);
    assert_eq!(c.advance(0, AdvanceTrigger::Timer).unwrap(), Transition::Ignored);
}

#[test]
fn test_verdict_after_completion_does_not_change_result() {
    let mut c = active(&[0]);
    let epoch = c.epoch();
    c.apply_verdict(epoch, &verdict(0.2, RiskLevel::Low, false));
    c.submit_answer(0, 0).unwrap();
    let Transition::Finished(result) = c.advance(0, AdvanceTrigger::User).unwrap() else {
        panic!("expected the session to finish");
    };

    let notices = c.apply_verdict(epoch, &verdict(1.0, RiskLevel::High, true));
    assert!(notices.is_empty());
    assert_eq!(c.result(), Some(result));
    assert!((c.integrity().latest_cheating_score - 0.2).abs() < 1e-9);
}

#[test]
fn test_timer_ticks_for_other_questions_are_ignored() {
    let mut c = active(&[0, 0]);
    assert!(c.timer_tick(0, 42));
    assert!(!c.timer_tick(1, 10));
    assert_eq!(c.snapshot().remaining_secs, 42);
}

#[test]
fn test_snapshot_reflects_progress_and_alerts() {
    let mut c = active(&[0, 1, 2, 3, 0]);
    let epoch = c.epoch();
    c.submit_answer(0, 0).unwrap();
    c.advance(0, AdvanceTrigger::User).unwrap();
    c.timer_tick(1, 9);
    c.record_visibility(VisibilityState::Hidden);
    c.apply_verdict(epoch, &verdict(0.8, RiskLevel::High, false));

    let snapshot = c.snapshot();
    assert_eq!(snapshot.question_number, 2);
    assert_eq!(snapshot.total_questions, 5);
    assert!((snapshot.progress - 0.4).abs() < 1e-9);
    assert!(snapshot.low_time);
    assert_eq!(snapshot.correct_so_far, 1);
    assert_eq!(snapshot.scored_so_far, 1);
    assert!(!snapshot.is_last_question);
    assert_eq!(snapshot.advance_label(), "Next");
    assert_eq!(snapshot.tab_switch_count, 1);
    assert!(snapshot.cheating_alert);
    assert_eq!(snapshot.options.len(), OPTION_COUNT);
}

#[test]
fn test_resets_equal_transitions_for_timed_out_session() {
    let mut c = active(&[0, 1, 2, 3, 0]);
    let mut restarts = 0;
    for index in 0..5 {
        match c.timer_expired(index).unwrap() {
            Transition::NextQuestion { .. } => restarts += 1,
            Transition::Finished(_) => {}
            Transition::Ignored => panic!("timer for current question was ignored"),
        }
    }
    assert_eq!(restarts, 4);
    assert_eq!(c.session().question_transitions(), 4);
    assert_eq!(c.status(), SessionStatus::Completed);
}
