//! Rule system types
//!
//! Core vocabulary for the timing rules engine: play outcomes, penalties,
//! stoppage reasons and the clock decision they produce.
//!
//! ## Design notes
//! - Every stoppage reason carries its canonical play-clock duration and
//!   restart policy, so adding a reason is a compile-time obligation on the
//!   mapping, not a runtime gap.
//! - Decisions are produced fresh per play and never mutated after return.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::config::ClockConfig;
use crate::situation::TeamId;

// ============================================================================
// Play outcomes
// ============================================================================

/// Play call as supplied by the host. Preserved verbatim in play records;
/// the processor never reclassifies one pass depth as another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
pub enum PlayType {
    Run,
    ShortPass,
    MediumPass,
    DeepPass,
    Kickoff,
    Punt,
    FieldGoalAttempt,
    ExtraPoint,
    Kneel,
    Spike,
}

impl PlayType {
    pub fn is_pass(self) -> bool {
        matches!(
            self,
            PlayType::ShortPass | PlayType::MediumPass | PlayType::DeepPass | PlayType::Spike
        )
    }

    pub fn is_kick(self) -> bool {
        matches!(
            self,
            PlayType::Kickoff | PlayType::Punt | PlayType::FieldGoalAttempt | PlayType::ExtraPoint
        )
    }
}

/// Scoring result of a play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoreType {
    Touchdown,
    FieldGoal,
    Safety,
}

/// Change-of-possession cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnoverType {
    Interception,
    Fumble,
}

// ============================================================================
// Penalties
// ============================================================================

/// Common NFL penalties with their canonical enforcement defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
pub enum PenaltyKind {
    FalseStart,
    Offside,
    Encroachment,
    DelayOfGame,
    Holding,
    PassInterference,
    Facemask,
    PersonalFoul,
    IntentionalGrounding,
}

impl PenaltyKind {
    /// Standard yardage for the penalty. Pass interference is a spot foul;
    /// the nominal 15 stands in for enforcement the host resolves.
    pub fn yards(self) -> u8 {
        match self {
            PenaltyKind::FalseStart
            | PenaltyKind::Offside
            | PenaltyKind::Encroachment
            | PenaltyKind::DelayOfGame => 5,
            PenaltyKind::Holding | PenaltyKind::IntentionalGrounding => 10,
            PenaltyKind::PassInterference
            | PenaltyKind::Facemask
            | PenaltyKind::PersonalFoul => 15,
        }
    }

    /// Whether the penalty awards an automatic first down when committed by
    /// the defense.
    pub fn automatic_first_down(self) -> bool {
        matches!(
            self,
            PenaltyKind::PassInterference | PenaltyKind::Facemask | PenaltyKind::PersonalFoul
        )
    }

    /// Dead-ball fouls are enforced before the snap; the game clock state is
    /// left unchanged.
    pub fn dead_ball(self) -> bool {
        matches!(
            self,
            PenaltyKind::FalseStart | PenaltyKind::Encroachment | PenaltyKind::DelayOfGame
        )
    }
}

/// A penalty attached to a play outcome or administered between plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenaltyInfo {
    pub kind: PenaltyKind,
    /// Team the penalty is called against.
    pub against: TeamId,
    pub yards: u8,
    pub automatic_first_down: bool,
    /// Enforced before the snap (pre-snap foul).
    pub dead_ball: bool,
}

impl PenaltyInfo {
    /// Penalty with the kind's canonical defaults.
    pub fn new(kind: PenaltyKind, against: TeamId) -> Self {
        Self {
            kind,
            against,
            yards: kind.yards(),
            automatic_first_down: kind.automatic_first_down(),
            dead_ball: kind.dead_ball(),
        }
    }

    /// Defensive penalty carrying an automatic first down, relative to the
    /// offense; the qualifying condition for an untimed down.
    pub fn qualifies_for_untimed_down(&self, offense: TeamId) -> bool {
        self.against == offense.opponent() && self.automatic_first_down
    }
}

// ============================================================================
// Raw play result
// ============================================================================

/// Raw result of a play as reported by the host simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayOutcome {
    pub play_type: PlayType,
    /// Net yards gained by the offense (negative for a loss).
    pub yards: i32,
    /// Pass completion; true for all non-pass plays.
    pub complete: bool,
    /// Ball carrier went out of bounds to end the play.
    pub out_of_bounds: bool,
    pub score: Option<ScoreType>,
    pub turnover: Option<TurnoverType>,
    pub penalty: Option<PenaltyInfo>,
}

impl PlayOutcome {
    pub fn run(yards: i32) -> Self {
        Self {
            play_type: PlayType::Run,
            yards,
            complete: true,
            out_of_bounds: false,
            score: None,
            turnover: None,
            penalty: None,
        }
    }

    pub fn completed_pass(play_type: PlayType, yards: i32) -> Self {
        debug_assert!(play_type.is_pass());
        Self {
            play_type,
            yards,
            complete: true,
            out_of_bounds: false,
            score: None,
            turnover: None,
            penalty: None,
        }
    }

    pub fn incomplete_pass(play_type: PlayType) -> Self {
        debug_assert!(play_type.is_pass());
        Self {
            play_type,
            yards: 0,
            complete: false,
            out_of_bounds: false,
            score: None,
            turnover: None,
            penalty: None,
        }
    }

    pub fn kneel() -> Self {
        Self {
            play_type: PlayType::Kneel,
            yards: -1,
            complete: true,
            out_of_bounds: false,
            score: None,
            turnover: None,
            penalty: None,
        }
    }

    pub fn spike() -> Self {
        Self {
            play_type: PlayType::Spike,
            yards: 0,
            complete: false,
            out_of_bounds: false,
            score: None,
            turnover: None,
            penalty: None,
        }
    }

    pub fn punt(yards: i32) -> Self {
        Self {
            play_type: PlayType::Punt,
            yards,
            complete: true,
            out_of_bounds: false,
            score: None,
            turnover: None,
            penalty: None,
        }
    }

    pub fn with_score(mut self, score: ScoreType) -> Self {
        self.score = Some(score);
        self
    }

    pub fn with_out_of_bounds(mut self) -> Self {
        self.out_of_bounds = true;
        self
    }

    pub fn with_turnover(mut self, turnover: TurnoverType) -> Self {
        self.turnover = Some(turnover);
        self
    }

    pub fn with_penalty(mut self, penalty: PenaltyInfo) -> Self {
        self.penalty = Some(penalty);
        self
    }

    pub fn is_scoring_play(&self) -> bool {
        self.score.is_some()
    }

    pub fn is_incomplete_pass(&self) -> bool {
        self.play_type.is_pass() && !self.complete && self.turnover.is_none()
    }
}

// ============================================================================
// Stoppage reasons and the clock decision
// ============================================================================

/// When the game clock restarts after a stoppage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RestartPolicy {
    /// Clock restarts at the next snap.
    OnSnap,
    /// Clock restarts at the referee's ready-for-play signal.
    OnReady,
}

/// Every NFL cause for stopping the game clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
pub enum ClockStoppingReason {
    IncompletePass,
    OutOfBounds,
    Score,
    Penalty,
    Timeout,
    TwoMinuteWarning,
    QuarterEnd,
    ChangeOfPossession,
    Injury,
}

impl ClockStoppingReason {
    /// Play clock armed after this stoppage. The 40-second clock follows
    /// ordinary play endings; administrative stoppages arm the short clock.
    pub fn play_clock_duration(self) -> PlayClockDuration {
        match self {
            ClockStoppingReason::IncompletePass | ClockStoppingReason::OutOfBounds => {
                PlayClockDuration::Normal40
            }
            ClockStoppingReason::Score
            | ClockStoppingReason::Penalty
            | ClockStoppingReason::Timeout
            | ClockStoppingReason::TwoMinuteWarning
            | ClockStoppingReason::QuarterEnd
            | ClockStoppingReason::ChangeOfPossession
            | ClockStoppingReason::Injury => PlayClockDuration::Short25,
        }
    }

    /// Canonical restart policy for this reason. Out of bounds restarts on
    /// the ready signal outside the two-minute window; the engine tightens it
    /// to the snap inside the window.
    pub fn restart_policy(self) -> RestartPolicy {
        match self {
            ClockStoppingReason::OutOfBounds
            | ClockStoppingReason::Penalty
            | ClockStoppingReason::Injury => RestartPolicy::OnReady,
            ClockStoppingReason::IncompletePass
            | ClockStoppingReason::Score
            | ClockStoppingReason::Timeout
            | ClockStoppingReason::TwoMinuteWarning
            | ClockStoppingReason::QuarterEnd
            | ClockStoppingReason::ChangeOfPossession => RestartPolicy::OnSnap,
        }
    }
}

/// Play clock length selected by the rules engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlayClockDuration {
    #[default]
    Normal40,
    Short25,
}

impl PlayClockDuration {
    pub fn seconds(self, config: &ClockConfig) -> u32 {
        match self {
            PlayClockDuration::Normal40 => config.play_clock_normal_secs,
            PlayClockDuration::Short25 => config.play_clock_short_secs,
        }
    }
}

/// Instructions from the rules engine to the clock. Produced fresh per
/// decision; immutable once returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockDecision {
    pub should_stop: bool,
    pub stop_reason: Option<ClockStoppingReason>,
    pub restart_on_snap: bool,
    pub restart_on_ready: bool,
    pub play_clock_duration: PlayClockDuration,
    /// Seconds to deduct from the game clock (ten-second runoff), 0 otherwise.
    pub runoff_seconds: u32,
    /// One untimed down is granted; the processor consumes eligibility.
    pub grant_untimed_down: bool,
}

impl ClockDecision {
    /// Clock keeps running; normal play clock.
    pub fn continue_running() -> Self {
        Self {
            should_stop: false,
            stop_reason: None,
            restart_on_snap: false,
            restart_on_ready: false,
            play_clock_duration: PlayClockDuration::Normal40,
            runoff_seconds: 0,
            grant_untimed_down: false,
        }
    }

    /// Stoppage with the reason's canonical duration and restart policy.
    pub fn stop(reason: ClockStoppingReason) -> Self {
        let policy = reason.restart_policy();
        Self {
            should_stop: true,
            stop_reason: Some(reason),
            restart_on_snap: policy == RestartPolicy::OnSnap,
            restart_on_ready: policy == RestartPolicy::OnReady,
            play_clock_duration: reason.play_clock_duration(),
            runoff_seconds: 0,
            grant_untimed_down: false,
        }
    }

    /// Override the restart policy (situational rule refinement).
    pub fn with_restart(mut self, policy: RestartPolicy) -> Self {
        self.restart_on_snap = policy == RestartPolicy::OnSnap;
        self.restart_on_ready = policy == RestartPolicy::OnReady;
        self
    }

    pub fn with_play_clock(mut self, duration: PlayClockDuration) -> Self {
        self.play_clock_duration = duration;
        self
    }

    pub fn with_runoff(mut self, seconds: u32) -> Self {
        self.runoff_seconds = seconds;
        self
    }

    /// Untimed down granted: clock stays stopped at zero, no quarter end.
    pub fn untimed_down() -> Self {
        Self {
            should_stop: false,
            stop_reason: None,
            restart_on_snap: false,
            restart_on_ready: false,
            play_clock_duration: PlayClockDuration::Short25,
            runoff_seconds: 0,
            grant_untimed_down: true,
        }
    }
}

// ============================================================================
// Decision statistics
// ============================================================================

/// Decision counters for QA and balance checks. Atomic so a shared engine
/// can record from multiple threads without locking.
#[derive(Debug, Default)]
pub struct DecisionStats {
    pub plays_evaluated: AtomicU64,
    pub stops: AtomicU64,
    pub incomplete_passes: AtomicU64,
    pub out_of_bounds: AtomicU64,
    pub scores: AtomicU64,
    pub penalties: AtomicU64,
    pub timeouts: AtomicU64,
    pub two_minute_warnings: AtomicU64,
    pub quarter_ends: AtomicU64,
    pub possession_changes: AtomicU64,
    pub injuries: AtomicU64,
    pub untimed_downs_granted: AtomicU64,
    pub runoffs_applied: AtomicU64,
}

impl DecisionStats {
    pub fn record(&self, decision: &ClockDecision) {
        self.plays_evaluated.fetch_add(1, Ordering::Relaxed);
        if decision.grant_untimed_down {
            self.untimed_downs_granted.fetch_add(1, Ordering::Relaxed);
        }
        if decision.runoff_seconds > 0 {
            self.runoffs_applied.fetch_add(1, Ordering::Relaxed);
        }
        if !decision.should_stop {
            return;
        }
        self.stops.fetch_add(1, Ordering::Relaxed);
        let counter = match decision.stop_reason {
            Some(ClockStoppingReason::IncompletePass) => &self.incomplete_passes,
            Some(ClockStoppingReason::OutOfBounds) => &self.out_of_bounds,
            Some(ClockStoppingReason::Score) => &self.scores,
            Some(ClockStoppingReason::Penalty) => &self.penalties,
            Some(ClockStoppingReason::Timeout) => &self.timeouts,
            Some(ClockStoppingReason::TwoMinuteWarning) => &self.two_minute_warnings,
            Some(ClockStoppingReason::QuarterEnd) => &self.quarter_ends,
            Some(ClockStoppingReason::ChangeOfPossession) => &self.possession_changes,
            Some(ClockStoppingReason::Injury) => &self.injuries,
            None => return,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Fraction of evaluated plays that stopped the clock.
    pub fn stop_rate(&self) -> f64 {
        let total = self.plays_evaluated.load(Ordering::Relaxed);
        if total == 0 {
            return 0.0;
        }
        self.stops.load(Ordering::Relaxed) as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_every_reason_has_a_mapping() {
        // Exhaustive walk: each reason must yield a duration and a restart
        // policy without panicking, and the decision built from it must be
        // internally consistent.
        for reason in ClockStoppingReason::iter() {
            let decision = ClockDecision::stop(reason);
            assert!(decision.should_stop);
            assert_eq!(decision.stop_reason, Some(reason));
            assert_ne!(
                decision.restart_on_snap, decision.restart_on_ready,
                "{:?} must restart on exactly one signal",
                reason
            );
        }
    }

    #[test]
    fn test_timeout_arms_short_clock() {
        let decision = ClockDecision::stop(ClockStoppingReason::Timeout);
        assert_eq!(decision.play_clock_duration, PlayClockDuration::Short25);
    }

    #[test]
    fn test_ordinary_play_endings_arm_normal_clock() {
        for reason in [
            ClockStoppingReason::IncompletePass,
            ClockStoppingReason::OutOfBounds,
        ] {
            assert_eq!(reason.play_clock_duration(), PlayClockDuration::Normal40);
        }
    }

    #[test]
    fn test_penalty_defaults() {
        for kind in PenaltyKind::iter() {
            let info = PenaltyInfo::new(kind, TeamId::AWAY);
            assert_eq!(info.yards, kind.yards());
            assert_eq!(info.automatic_first_down, kind.automatic_first_down());
            assert_eq!(info.dead_ball, kind.dead_ball());
        }
    }

    #[test]
    fn test_untimed_down_qualification() {
        let offense = TeamId::HOME;
        let dpi = PenaltyInfo::new(PenaltyKind::PassInterference, TeamId::AWAY);
        assert!(dpi.qualifies_for_untimed_down(offense));

        // Same penalty against the offense does not qualify.
        let opi = PenaltyInfo::new(PenaltyKind::PassInterference, TeamId::HOME);
        assert!(!opi.qualifies_for_untimed_down(offense));

        // Defensive offside has no automatic first down.
        let offside = PenaltyInfo::new(PenaltyKind::Offside, TeamId::AWAY);
        assert!(!offside.qualifies_for_untimed_down(offense));
    }

    #[test]
    fn test_play_type_preserved_in_outcome() {
        let outcome = PlayOutcome::completed_pass(PlayType::MediumPass, 12);
        assert_eq!(outcome.play_type, PlayType::MediumPass);

        let outcome = PlayOutcome::incomplete_pass(PlayType::DeepPass);
        assert!(outcome.is_incomplete_pass());
        assert_eq!(outcome.play_type, PlayType::DeepPass);
    }

    #[test]
    fn test_interception_is_not_incomplete() {
        let outcome = PlayOutcome::incomplete_pass(PlayType::DeepPass)
            .with_turnover(TurnoverType::Interception);
        assert!(!outcome.is_incomplete_pass());
    }

    #[test]
    fn test_play_clock_duration_from_config() {
        let config = ClockConfig::default();
        assert_eq!(PlayClockDuration::Normal40.seconds(&config), 40);
        assert_eq!(PlayClockDuration::Short25.seconds(&config), 25);
    }

    #[test]
    fn test_stats_record() {
        let stats = DecisionStats::default();
        stats.record(&ClockDecision::continue_running());
        stats.record(&ClockDecision::stop(ClockStoppingReason::Timeout));
        stats.record(&ClockDecision::stop(ClockStoppingReason::Score));

        assert_eq!(stats.plays_evaluated.load(Ordering::Relaxed), 3);
        assert_eq!(stats.stops.load(Ordering::Relaxed), 2);
        assert_eq!(stats.timeouts.load(Ordering::Relaxed), 1);
        assert_eq!(stats.scores.load(Ordering::Relaxed), 1);
        assert!((stats.stop_rate() - 2.0 / 3.0).abs() < 1e-9);
    }
}
