//! Play outcome processor
//!
//! Translates raw play results into an updated `GameSituation` plus the
//! rules engine's `ClockDecision`. The engine is the sole source of stoppage
//! truth; the processor owns the between-play bookkeeping (downs, distance,
//! possession, timeouts, untimed-down eligibility).
//!
//! The processor never touches `GameClock`. The host (or `GameSession`)
//! applies the returned decision and syncs time back into the situation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::RulesError;
use crate::rng::OutcomeRng;
use crate::rules::{
    ClockDecision, ClockStoppingReason, PenaltyInfo, PeriodOutcome, PlayOutcome, PlayType,
    RulesEngine, TurnoverType,
};
use crate::situation::{GameSituation, TeamId};

/// Chance that a deep incomplete pass is tipped and picked off. Only rolled
/// when randomness is enabled; a disabled source never fires it.
const TIP_DRILL_INTERCEPTION_CHANCE: f64 = 0.02;

/// Yards to go after a fresh set of downs.
const FRESH_SET_DISTANCE: u16 = 10;

/// Record of one processed play. `play_type` is the caller's value verbatim;
/// the processor never reclassifies a play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayRecord {
    pub play_type: PlayType,
    pub yards: i32,
    pub decision: ClockDecision,
}

/// Stateful play-to-decision pipeline. One per game, single logical owner;
/// the shared pieces (`RulesEngine`) stay behind `Arc`.
pub struct PlayOutcomeProcessor {
    engine: Arc<RulesEngine>,
    situation: GameSituation,
    rng: Box<dyn OutcomeRng>,
    history: Vec<PlayRecord>,
}

impl PlayOutcomeProcessor {
    pub fn new(engine: Arc<RulesEngine>, rng: Box<dyn OutcomeRng>) -> Self {
        let situation = GameSituation::opening(engine.config());
        Self {
            engine,
            situation,
            rng,
            history: Vec::new(),
        }
    }

    pub fn situation(&self) -> &GameSituation {
        &self.situation
    }

    /// Mutable access for consistency repair (`GameClock::sync_situation`).
    pub fn situation_mut(&mut self) -> &mut GameSituation {
        &mut self.situation
    }

    pub fn history(&self) -> &[PlayRecord] {
        &self.history
    }

    pub fn last_play(&self) -> Option<&PlayRecord> {
        self.history.last()
    }

    /// Process a play: resolve probabilistic sub-outcomes, query the engine,
    /// update the owned situation and record the play.
    pub fn process(
        &mut self,
        outcome: &PlayOutcome,
    ) -> Result<(GameSituation, ClockDecision), RulesError> {
        let mut resolved = outcome.clone();

        // Tip-drill interception on a deep incompletion. Gated behind the
        // injected random source so deterministic replays can disable it.
        if resolved.play_type == PlayType::DeepPass
            && resolved.is_incomplete_pass()
            && resolved.penalty.is_none()
            && self.rng.chance(TIP_DRILL_INTERCEPTION_CHANCE)
        {
            resolved.turnover = Some(TurnoverType::Interception);
            log::debug!("deep incompletion tipped and intercepted");
        }

        let decision = self.engine.process_play(&self.situation, &resolved)?;
        self.apply_bookkeeping(&resolved, &decision);

        self.history.push(PlayRecord {
            play_type: outcome.play_type,
            yards: resolved.yards,
            decision: decision.clone(),
        });

        Ok((self.situation.clone(), decision))
    }

    /// Process a play with an attached penalty.
    pub fn process_with_penalty(
        &mut self,
        outcome: &PlayOutcome,
        penalty: PenaltyInfo,
    ) -> Result<(GameSituation, ClockDecision), RulesError> {
        let outcome = outcome.clone().with_penalty(penalty);
        self.process(&outcome)
    }

    /// Administer a standalone (between-plays) penalty.
    pub fn process_penalty(
        &mut self,
        penalty: &PenaltyInfo,
    ) -> Result<(GameSituation, ClockDecision), RulesError> {
        let decision = self.engine.process_penalty(penalty, &self.situation)?;
        if decision.grant_untimed_down {
            self.situation.untimed_down_available = false;
        }
        self.apply_penalty_yardage(penalty);
        Ok((self.situation.clone(), decision))
    }

    /// Charge a timeout to `team` and return the stoppage decision.
    pub fn call_timeout(&mut self, team: TeamId) -> Result<ClockDecision, RulesError> {
        let decision = self.engine.call_timeout(team, &self.situation)?;
        self.situation.timeouts_remaining[team.index()] -= 1;
        Ok(decision)
    }

    /// End-of-period ruling; on continuation the owned situation rolls over.
    pub fn advance_period(&mut self, score_tied: bool) -> Result<PeriodOutcome, RulesError> {
        let outcome = self.engine.advance_quarter(&self.situation, score_tied)?;
        match &outcome {
            PeriodOutcome::NextPeriod(next) | PeriodOutcome::Halftime(next) => {
                self.situation = next.clone();
            }
            PeriodOutcome::GameOver { .. } => {}
        }
        Ok(outcome)
    }

    // ========================================================================
    // Between-play bookkeeping
    // ========================================================================

    fn apply_bookkeeping(&mut self, outcome: &PlayOutcome, decision: &ClockDecision) {
        if decision.grant_untimed_down {
            self.situation.untimed_down_available = false;
        }
        if decision.stop_reason == Some(ClockStoppingReason::TwoMinuteWarning) {
            self.situation.two_minute_warning_given = true;
        }

        if outcome.score.is_some() {
            // Every score is followed by a kick to the other side.
            self.flip_possession();
            return;
        }
        if outcome.turnover.is_some() {
            self.flip_possession();
            return;
        }

        match outcome.play_type {
            // Kicks hand the ball over.
            PlayType::Kickoff | PlayType::Punt => {
                self.flip_possession();
                return;
            }
            // A missed field goal is a change of possession at the spot.
            PlayType::FieldGoalAttempt => {
                self.flip_possession();
                return;
            }
            // The try is followed by a kickoff; fresh set for the receivers.
            PlayType::ExtraPoint => {
                self.situation.down = 1;
                self.situation.distance = FRESH_SET_DISTANCE;
                return;
            }
            _ => {}
        }

        if let Some(penalty) = &outcome.penalty {
            self.apply_penalty_yardage(penalty);
            return;
        }

        self.advance_down(outcome);
    }

    fn flip_possession(&mut self) {
        self.situation.possession = self.situation.possession.opponent();
        self.situation.down = 1;
        self.situation.distance = FRESH_SET_DISTANCE;
    }

    fn apply_penalty_yardage(&mut self, penalty: &PenaltyInfo) {
        let offense = self.situation.possession;
        if penalty.against == offense {
            // Offensive foul: replay the down with the distance pushed back.
            self.situation.distance = self
                .situation
                .distance
                .saturating_add(u16::from(penalty.yards))
                .min(99);
        } else if penalty.automatic_first_down {
            self.situation.down = 1;
            self.situation.distance = FRESH_SET_DISTANCE;
        } else {
            self.situation.distance =
                self.situation.distance.saturating_sub(u16::from(penalty.yards));
            if self.situation.distance == 0 {
                self.situation.down = 1;
                self.situation.distance = FRESH_SET_DISTANCE;
            }
        }
    }

    fn advance_down(&mut self, outcome: &PlayOutcome) {
        let gained_first_down =
            outcome.complete && self.situation.distance > 0 && outcome.yards >= i32::from(self.situation.distance);

        if gained_first_down {
            self.situation.down = 1;
            self.situation.distance = FRESH_SET_DISTANCE;
            return;
        }

        let new_distance =
            (i32::from(self.situation.distance) - outcome.yards).clamp(0, 99) as u16;
        self.situation.distance = new_distance;

        if self.situation.down >= 4 {
            // Turnover on downs.
            self.flip_possession();
        } else {
            self.situation.down += 1;
        }
    }
}
