//! End-to-end rule scenarios driven through the session facade.
//!
//! These cover the edge cases where clock bugs historically live: scoring as
//! time expires, untimed downs, the two-minute warning, and overtime rule
//! variants.

use std::sync::Arc;

use crate::clock::ClockState;
use crate::config::ClockConfig;
use crate::processor::PlayOutcomeProcessor;
use crate::rng::NoRandomness;
use crate::rules::{
    ClockStoppingReason, PenaltyInfo, PenaltyKind, PeriodOutcome, PlayClockDuration, PlayOutcome,
    PlayType, RulesEngine, ScoreType,
};
use crate::session::GameSession;
use crate::situation::{Quarter, TeamId};

fn session() -> GameSession {
    GameSession::without_randomness(ClockConfig::default()).expect("valid config")
}

/// Run the current period's clock down to zero, playing through a two-minute
/// warning stoppage if one fires on the way.
fn run_out_period(session: &mut GameSession) {
    if session.clock_state() != ClockState::Running {
        session.start().expect("clock starts");
    }
    loop {
        let remaining = session.snapshot().time_remaining_secs;
        let events = session.tick(f64::from(remaining)).expect("tick");
        if events.quarter_expired {
            break;
        }
        if events.two_minute_warning {
            session.ready_for_play().expect("ready");
            session.snap().expect("snap");
        }
    }
}

#[test]
fn touchdown_as_time_expires_is_a_score_not_a_quarter_end() {
    let mut session = session();
    run_out_period(&mut session);
    assert_eq!(session.situation().time_remaining, 0);

    let outcome = PlayOutcome::run(8).with_score(ScoreType::Touchdown);
    let decision = session.process_play(&outcome).unwrap();

    assert_eq!(decision.stop_reason, Some(ClockStoppingReason::Score));
}

#[test]
fn untimed_down_runs_at_zero_and_eligibility_is_consumed() {
    let mut session = session();
    run_out_period(&mut session);

    let offense = session.situation().possession;
    let dpi = PenaltyInfo::new(PenaltyKind::PassInterference, offense.opponent());
    let outcome = PlayOutcome::incomplete_pass(PlayType::DeepPass).with_penalty(dpi);

    let decision = session.process_play(&outcome).unwrap();
    assert!(!decision.should_stop);
    assert!(decision.grant_untimed_down);
    assert!(!session.situation().untimed_down_available);

    // The extra down is snapped at 0:00; the game clock never restarts.
    assert_eq!(session.clock_state(), ClockState::Stopped);
    session.ready_for_play().unwrap();
    session.snap().unwrap();
    assert_eq!(session.clock_state(), ClockState::Stopped);

    // A second expiry play without a fresh penalty ends the quarter.
    let decision = session.process_play(&PlayOutcome::run(3)).unwrap();
    assert_eq!(decision.stop_reason, Some(ClockStoppingReason::QuarterEnd));
    assert_eq!(session.clock_state(), ClockState::Expired);
}

#[test]
fn two_minute_warning_triggers_once_per_half() {
    let mut session = session();
    run_out_period(&mut session);
    session.advance_quarter(false).unwrap();
    session.start().unwrap();

    // Tick across 2:00 from 2:01: the stoppage lands exactly on the
    // threshold.
    session.tick(900.0 - 121.0).unwrap();
    let events = session.tick(21.0).unwrap();
    assert!(events.two_minute_warning);
    assert_eq!(session.snapshot().time_remaining_secs, 120);
    assert_eq!(session.clock_state(), ClockState::Stopped);
    assert!(session.situation().two_minute_warning_given);

    // Play resumes; neither ticking nor the next play re-triggers it.
    session.ready_for_play().unwrap();
    session.snap().unwrap();
    assert_eq!(session.clock_state(), ClockState::Running);
    let events = session.tick(5.0).unwrap();
    assert!(!events.two_minute_warning);
    let decision = session.process_play(&PlayOutcome::run(4)).unwrap();
    assert_ne!(
        decision.stop_reason,
        Some(ClockStoppingReason::TwoMinuteWarning)
    );
}

#[test]
fn play_boundary_two_minute_warning_is_exactly_once() {
    // A host driving the processor directly (no live clock) still gets the
    // warning stoppage on the first play inside the window, and only there.
    let engine = Arc::new(RulesEngine::new(ClockConfig::default()).unwrap());
    let mut processor = PlayOutcomeProcessor::new(engine, Box::new(NoRandomness));
    processor.situation_mut().quarter = Quarter::Second;
    processor.situation_mut().time_remaining = 118;

    let (situation, decision) = processor.process(&PlayOutcome::run(2)).unwrap();
    assert_eq!(
        decision.stop_reason,
        Some(ClockStoppingReason::TwoMinuteWarning)
    );
    assert!(situation.two_minute_warning_given);

    let (_, decision) = processor.process(&PlayOutcome::run(2)).unwrap();
    assert_ne!(
        decision.stop_reason,
        Some(ClockStoppingReason::TwoMinuteWarning)
    );
}

#[test]
fn timeout_arms_the_short_play_clock() {
    let mut session = session();
    session.start().unwrap();
    session.tick(12.0).unwrap();

    let decision = session.call_timeout(TeamId::AWAY).unwrap();
    assert_eq!(decision.stop_reason, Some(ClockStoppingReason::Timeout));
    assert_eq!(decision.play_clock_duration, PlayClockDuration::Short25);

    session.ready_for_play().unwrap();
    assert_eq!(session.snapshot().play_clock_secs, 25);
}

#[test]
fn regular_season_overtime_is_ten_minutes_and_may_tie() {
    let mut session = session();
    for _ in 0..3 {
        run_out_period(&mut session);
        session.advance_quarter(false).unwrap();
    }
    run_out_period(&mut session);

    // Tied at the end of regulation: ten-minute overtime.
    match session.advance_quarter(true).unwrap() {
        PeriodOutcome::NextPeriod(next) => {
            assert_eq!(next.quarter, Quarter::Overtime(1));
            assert_eq!(next.time_remaining, 600);
        }
        other => panic!("expected overtime, got {:?}", other),
    }
    assert_eq!(session.snapshot().time_remaining_secs, 600);

    // Still tied after overtime: the game ends in a tie.
    run_out_period(&mut session);
    assert_eq!(
        session.advance_quarter(true).unwrap(),
        PeriodOutcome::GameOver { tie: true }
    );
}

#[test]
fn playoff_overtime_continues_at_fifteen_minutes_until_decided() {
    let mut session =
        GameSession::without_randomness(ClockConfig::playoff()).expect("valid config");
    for _ in 0..3 {
        run_out_period(&mut session);
        session.advance_quarter(false).unwrap();
    }
    run_out_period(&mut session);

    // Playoff overtime is configured at 15 minutes.
    match session.advance_quarter(true).unwrap() {
        PeriodOutcome::NextPeriod(next) => {
            assert_eq!(next.quarter, Quarter::Overtime(1));
            assert_eq!(next.time_remaining, 900);
        }
        other => panic!("expected overtime, got {:?}", other),
    }

    // Tied again: no tie permitted, another period follows.
    run_out_period(&mut session);
    match session.advance_quarter(true).unwrap() {
        PeriodOutcome::NextPeriod(next) => {
            assert_eq!(next.quarter, Quarter::Overtime(2));
            assert_eq!(next.time_remaining, 900);
        }
        other => panic!("expected a second overtime, got {:?}", other),
    }

    // A winner ends it.
    run_out_period(&mut session);
    assert_eq!(
        session.advance_quarter(false).unwrap(),
        PeriodOutcome::GameOver { tie: false }
    );
}

#[test]
fn ten_second_runoff_can_end_the_half() {
    let mut session = session();
    run_out_period(&mut session);
    session.advance_quarter(false).unwrap();
    session.start().unwrap();

    // Late Q2: the warning stoppage fires at 2:00 on the way down to 0:08.
    let events = session.tick(900.0 - 120.0).unwrap();
    assert!(events.two_minute_warning);
    session.ready_for_play().unwrap();
    session.snap().unwrap();
    session.tick(112.0).unwrap();
    assert_eq!(session.snapshot().time_remaining_secs, 8);

    // Offensive false start: the ten-second runoff wipes out what is left.
    let offense = session.situation().possession;
    let false_start = PenaltyInfo::new(PenaltyKind::FalseStart, offense);
    let decision = session.process_penalty(&false_start).unwrap();
    assert_eq!(decision.runoff_seconds, 10);
    assert_eq!(session.snapshot().time_remaining_secs, 0);
    assert_eq!(session.clock_state(), ClockState::Expired);
}

#[test]
fn identical_seeds_replay_identically() {
    let script: Vec<PlayOutcome> = (0..60)
        .map(|i| match i % 4 {
            0 => PlayOutcome::incomplete_pass(PlayType::DeepPass),
            1 => PlayOutcome::run(i % 9),
            2 => PlayOutcome::completed_pass(PlayType::MediumPass, 11),
            _ => PlayOutcome::run(2).with_out_of_bounds(),
        })
        .collect();

    let run = |seed: u64| {
        let mut session = GameSession::with_seed(ClockConfig::default(), seed).unwrap();
        session.start().unwrap();
        let mut decisions = Vec::new();
        for outcome in &script {
            session.tick(5.0).ok();
            decisions.push(session.process_play(outcome).unwrap());
            session.ready_for_play().ok();
            session.snap().ok();
        }
        decisions
    };

    assert_eq!(run(99), run(99));
}

#[test]
fn decision_sequences_serialize_stably() {
    // Byte-identical decision streams under a fixed seed.
    let mut a = GameSession::with_seed(ClockConfig::default(), 7).unwrap();
    let mut b = GameSession::with_seed(ClockConfig::default(), 7).unwrap();
    a.start().unwrap();
    b.start().unwrap();

    for _ in 0..25 {
        let outcome = PlayOutcome::incomplete_pass(PlayType::DeepPass);
        let da = a.process_play(&outcome).unwrap();
        let db = b.process_play(&outcome).unwrap();
        assert_eq!(
            serde_json::to_vec(&da).unwrap(),
            serde_json::to_vec(&db).unwrap()
        );
        a.snap().ok();
        b.snap().ok();
    }
}
