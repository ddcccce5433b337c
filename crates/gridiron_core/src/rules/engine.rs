//! Rules engine - centralized timing rule evaluation
//!
//! Pure, side-effect-free mapping from `(GameSituation, PlayOutcome)` to a
//! `ClockDecision`. The engine never mutates the situation it is given; it
//! returns instructions and the processor applies them.
//!
//! ## Evaluation order (fixed, do not change)
//! 1. Scoring plays (a score as time expires is a score, not a quarter end)
//! 2. Time expiration, including untimed-down eligibility
//! 3. Two-minute warning
//! 4. Outcome-specific rules (penalties, turnovers, incompletions, sideline)
//! 5. Default: clock keeps running

use crate::config::ClockConfig;
use crate::error::{ConfigError, RulesError};
use crate::situation::{GameSituation, Quarter, TeamId};

use super::types::{
    ClockDecision, ClockStoppingReason, DecisionStats, PenaltyInfo, PlayClockDuration,
    PlayOutcome, RestartPolicy,
};

/// Final-minute window in which an offensive foul carries a runoff.
const RUNOFF_WINDOW_SECS: u32 = 60;
/// Seconds deducted by a ten-second runoff.
const RUNOFF_SECS: u32 = 10;

/// Outcome of an end-of-period ruling.
#[derive(Debug, Clone, PartialEq)]
pub enum PeriodOutcome {
    /// Play continues in the next period.
    NextPeriod(GameSituation),
    /// Second quarter ended; half-time bookkeeping applied.
    Halftime(GameSituation),
    /// No further periods.
    GameOver { tie: bool },
}

/// Stateless timing-rule evaluator. Configuration-only; safe to share
/// read-only across threads (decision stats are atomic).
pub struct RulesEngine {
    config: ClockConfig,
    stats: DecisionStats,
}

impl RulesEngine {
    pub fn new(config: ClockConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            stats: DecisionStats::default(),
        })
    }

    pub fn config(&self) -> &ClockConfig {
        &self.config
    }

    pub fn stats(&self) -> &DecisionStats {
        &self.stats
    }

    /// Decide the clock impact of a finished play.
    pub fn process_play(
        &self,
        situation: &GameSituation,
        outcome: &PlayOutcome,
    ) -> Result<ClockDecision, RulesError> {
        situation.validate(&self.config)?;

        let decision = self.decide(situation, outcome);
        self.stats.record(&decision);
        log::debug!(
            "play decision: type={:?} stop={} reason={:?} runoff={}",
            outcome.play_type,
            decision.should_stop,
            decision.stop_reason,
            decision.runoff_seconds
        );
        Ok(decision)
    }

    fn decide(&self, situation: &GameSituation, outcome: &PlayOutcome) -> ClockDecision {
        // 1. Scoring plays stop the clock no matter how much time is left.
        if outcome.is_scoring_play() {
            return ClockDecision::stop(ClockStoppingReason::Score);
        }

        // 2. Time expiration. A qualifying defensive penalty grants one
        //    untimed down instead of ending the period.
        if situation.time_remaining == 0 {
            if let Some(penalty) = &outcome.penalty {
                if situation.untimed_down_available
                    && penalty.qualifies_for_untimed_down(situation.possession)
                {
                    return ClockDecision::untimed_down();
                }
            }
            return ClockDecision::stop(ClockStoppingReason::QuarterEnd);
        }

        // 3. Two-minute warning, forced once per half independent of outcome.
        if self.two_minute_warning_due(situation) {
            return ClockDecision::stop(ClockStoppingReason::TwoMinuteWarning);
        }

        // 4. Outcome-specific rules.
        if let Some(penalty) = &outcome.penalty {
            return self.penalty_decision(penalty, situation);
        }
        if outcome.turnover.is_some() {
            return ClockDecision::stop(ClockStoppingReason::ChangeOfPossession);
        }
        if outcome.is_incomplete_pass() {
            return ClockDecision::stop(ClockStoppingReason::IncompletePass);
        }
        if outcome.out_of_bounds {
            let decision = ClockDecision::stop(ClockStoppingReason::OutOfBounds);
            // Inside the two-minute window the sideline stops the clock until
            // the snap; outside it the clock restarts on the ready signal.
            return if situation.in_two_minute_window(&self.config) {
                decision.with_restart(RestartPolicy::OnSnap)
            } else {
                decision
            };
        }

        // 5. Default: clock keeps running.
        ClockDecision::continue_running()
    }

    /// Standalone penalty administration between plays.
    pub fn process_penalty(
        &self,
        penalty: &PenaltyInfo,
        situation: &GameSituation,
    ) -> Result<ClockDecision, RulesError> {
        situation.validate(&self.config)?;

        if situation.time_remaining == 0
            && situation.untimed_down_available
            && penalty.qualifies_for_untimed_down(situation.possession)
        {
            let decision = ClockDecision::untimed_down();
            self.stats.record(&decision);
            return Ok(decision);
        }

        let decision = self.penalty_decision(penalty, situation);
        self.stats.record(&decision);
        Ok(decision)
    }

    fn penalty_decision(&self, penalty: &PenaltyInfo, situation: &GameSituation) -> ClockDecision {
        let runoff = self.runoff_seconds(penalty, situation);
        if runoff > 0 {
            // The runoff is taken in lieu of a down; the clock stops for
            // enforcement and restarts on the ready signal.
            return ClockDecision::stop(ClockStoppingReason::Penalty).with_runoff(runoff);
        }
        if penalty.dead_ball {
            // Pre-snap foul: the game clock state is left unchanged, but
            // enforcement arms the short play clock.
            return ClockDecision::continue_running().with_play_clock(PlayClockDuration::Short25);
        }
        ClockDecision::stop(ClockStoppingReason::Penalty)
    }

    /// Ten-second runoff: an offensive foul that stops the clock inside the
    /// final minute of either half. Defensive fouls never run time off, so a
    /// runoff can never compete with an untimed down for the same decision.
    fn runoff_seconds(&self, penalty: &PenaltyInfo, situation: &GameSituation) -> u32 {
        let offensive = penalty.against == situation.possession;
        if offensive
            && situation.quarter.has_two_minute_warning()
            && situation.time_remaining > 0
            && situation.time_remaining <= RUNOFF_WINDOW_SECS
        {
            RUNOFF_SECS
        } else {
            0
        }
    }

    fn two_minute_warning_due(&self, situation: &GameSituation) -> bool {
        self.config.two_minute_warning_enabled
            && situation.quarter.has_two_minute_warning()
            && situation.time_remaining <= self.config.two_minute_warning_secs
            && !situation.two_minute_warning_given
    }

    /// Validate a timeout request against the team's remaining allotment.
    pub fn can_call_timeout(
        &self,
        team: TeamId,
        situation: &GameSituation,
    ) -> Result<(), RulesError> {
        situation.validate(&self.config)?;
        if situation.timeouts_for(team) == 0 {
            return Err(RulesError::NoTimeoutsRemaining { team });
        }
        Ok(())
    }

    /// Granted timeout: stoppage with the short play clock.
    pub fn call_timeout(
        &self,
        team: TeamId,
        situation: &GameSituation,
    ) -> Result<ClockDecision, RulesError> {
        self.can_call_timeout(team, situation)?;
        let decision = ClockDecision::stop(ClockStoppingReason::Timeout);
        self.stats.record(&decision);
        Ok(decision)
    }

    /// Rule on the end of the current period and produce the next situation.
    ///
    /// `score_tied` is supplied by the host (the engine does not track
    /// score). Regular-season overtime may end in a tie; under playoff rules
    /// tied overtime periods keep coming until someone wins.
    pub fn advance_quarter(
        &self,
        situation: &GameSituation,
        score_tied: bool,
    ) -> Result<PeriodOutcome, RulesError> {
        situation.validate(&self.config)?;

        let outcome = match situation.quarter {
            Quarter::First | Quarter::Third => {
                PeriodOutcome::NextPeriod(self.rollover(situation, situation.quarter.next()))
            }
            Quarter::Second => {
                let mut next = self.rollover(situation, Quarter::Third);
                // New half: fresh timeouts, fresh drive, warning rearmed.
                next.timeouts_remaining = [self.config.timeouts_per_half; 2];
                next.two_minute_warning_given = false;
                next.down = 1;
                next.distance = 10;
                PeriodOutcome::Halftime(next)
            }
            Quarter::Fourth => {
                if !score_tied {
                    PeriodOutcome::GameOver { tie: false }
                } else if self.config.overtime_length_secs == 0 {
                    PeriodOutcome::GameOver { tie: true }
                } else {
                    PeriodOutcome::NextPeriod(self.overtime_start(situation, 1))
                }
            }
            Quarter::Overtime(n) => {
                if !score_tied {
                    PeriodOutcome::GameOver { tie: false }
                } else if self.config.playoff_rules {
                    // No ties in the playoffs; play another period.
                    PeriodOutcome::NextPeriod(self.overtime_start(situation, n.saturating_add(1)))
                } else {
                    PeriodOutcome::GameOver { tie: true }
                }
            }
        };
        Ok(outcome)
    }

    fn rollover(&self, situation: &GameSituation, quarter: Quarter) -> GameSituation {
        let mut next = situation.clone();
        next.quarter = quarter;
        next.time_remaining = self.config.period_length_secs(quarter.is_overtime());
        next.untimed_down_available = true;
        next
    }

    fn overtime_start(&self, situation: &GameSituation, period: u8) -> GameSituation {
        let mut next = self.rollover(situation, Quarter::Overtime(period));
        next.timeouts_remaining = [self.config.overtime_timeouts; 2];
        next.two_minute_warning_given = false;
        next.down = 1;
        next.distance = 10;
        next
    }
}
