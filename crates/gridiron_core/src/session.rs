//! Game session - host API surface
//!
//! Composes the shared `GameClock`, the `RulesEngine` and the
//! `PlayOutcomeProcessor` into the flow the host drives:
//! `process_play` runs the processor, applies the resulting decision to the
//! clock, and syncs the clock's authoritative time back into the situation.
//!
//! The clock handle is shareable (`Arc`): a display thread reads snapshots
//! while the simulation thread drives the session.

use std::sync::Arc;

use serde::Serialize;

use crate::clock::{ClockSnapshot, ClockState, GameClock, TickEvents};
use crate::config::ClockConfig;
use crate::error::{GameClockError, Result};
use crate::processor::{PlayOutcomeProcessor, PlayRecord};
use crate::rng::{NoRandomness, OutcomeRng, SeededOutcomeRng};
use crate::rules::{ClockDecision, PenaltyInfo, PeriodOutcome, PlayOutcome, RulesEngine};
use crate::situation::{GameSituation, TeamId};

/// Combined view of clock and situation for display hosts.
#[derive(Debug, Clone, Serialize)]
pub struct GameStateView {
    pub clock: ClockSnapshot,
    pub situation: GameSituation,
}

/// One game: clock, rules and play processing behind a single facade.
pub struct GameSession {
    clock: Arc<GameClock>,
    engine: Arc<RulesEngine>,
    processor: PlayOutcomeProcessor,
}

impl GameSession {
    /// Production session with an entropy-seeded random source.
    pub fn new(config: ClockConfig) -> Result<Self> {
        let seed = rand::random::<u64>();
        Self::with_rng(config, Box::new(SeededOutcomeRng::new(seed)))
    }

    /// Deterministic session: the same seed replays identically.
    pub fn with_seed(config: ClockConfig, seed: u64) -> Result<Self> {
        Self::with_rng(config, Box::new(SeededOutcomeRng::new(seed)))
    }

    /// Session with probabilistic sub-outcomes disabled.
    pub fn without_randomness(config: ClockConfig) -> Result<Self> {
        Self::with_rng(config, Box::new(NoRandomness))
    }

    pub fn with_rng(config: ClockConfig, rng: Box<dyn OutcomeRng>) -> Result<Self> {
        let engine = Arc::new(RulesEngine::new(config.clone())?);
        let clock = Arc::new(GameClock::new(config)?);
        let processor = PlayOutcomeProcessor::new(Arc::clone(&engine), rng);
        Ok(Self {
            clock,
            engine,
            processor,
        })
    }

    // ========================================================================
    // Clock control
    // ========================================================================

    pub fn start(&self) -> Result<()> {
        self.clock.start().map_err(GameClockError::from)
    }

    pub fn stop(&self) -> Result<()> {
        self.clock.stop().map_err(GameClockError::from)
    }

    /// Advance simulated time. A two-minute-warning crossing syncs the
    /// situation bookkeeping immediately.
    pub fn tick(&mut self, delta: f64) -> Result<TickEvents> {
        let events = self.clock.tick(delta)?;
        if events.two_minute_warning || events.quarter_expired {
            self.clock.sync_situation(self.processor.situation_mut());
        }
        Ok(events)
    }

    pub fn ready_for_play(&self) -> Result<()> {
        self.clock.ready_for_play().map_err(GameClockError::from)
    }

    pub fn snap(&self) -> Result<()> {
        self.clock.snap().map_err(GameClockError::from)
    }

    pub fn set_clock_speed(&self, multiplier: f64) -> Result<()> {
        self.clock
            .set_clock_speed(multiplier)
            .map_err(GameClockError::from)
    }

    // ========================================================================
    // Play flow
    // ========================================================================

    /// Process a finished play end to end: decision, clock application,
    /// situation sync.
    pub fn process_play(&mut self, outcome: &PlayOutcome) -> Result<ClockDecision> {
        self.clock.sync_situation(self.processor.situation_mut());
        let (_, decision) = self.processor.process(outcome)?;
        self.clock.apply_decision(&decision)?;
        self.clock.sync_situation(self.processor.situation_mut());
        Ok(decision)
    }

    /// Administer a standalone penalty between plays.
    pub fn process_penalty(&mut self, penalty: &PenaltyInfo) -> Result<ClockDecision> {
        self.clock.sync_situation(self.processor.situation_mut());
        let (_, decision) = self.processor.process_penalty(penalty)?;
        self.clock.apply_decision(&decision)?;
        self.clock.sync_situation(self.processor.situation_mut());
        Ok(decision)
    }

    /// Charge a timeout to `team` and stop the clock.
    pub fn call_timeout(&mut self, team: TeamId) -> Result<ClockDecision> {
        self.clock.sync_situation(self.processor.situation_mut());
        let decision = self.processor.call_timeout(team)?;
        self.clock.apply_decision(&decision)?;
        Ok(decision)
    }

    /// Rule on the end of the expired period and move both the clock and the
    /// situation into the next one (when the game continues).
    pub fn advance_quarter(&mut self, score_tied: bool) -> Result<PeriodOutcome> {
        let ruling = self.processor.advance_period(score_tied)?;
        match &ruling {
            PeriodOutcome::NextPeriod(_) | PeriodOutcome::Halftime(_) => {
                self.clock.advance_quarter()?;
                self.clock.sync_situation(self.processor.situation_mut());
            }
            PeriodOutcome::GameOver { tie } => {
                log::info!("game over (tie: {})", tie);
            }
        }
        Ok(ruling)
    }

    /// Repair clock/situation disagreement without discarding the game.
    pub fn sync_clocks(&mut self) -> usize {
        let repairs = self.clock.reset_to_valid_state();
        self.clock.sync_situation(self.processor.situation_mut());
        repairs
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub fn situation(&self) -> GameSituation {
        self.processor.situation().clone()
    }

    pub fn clock_state(&self) -> ClockState {
        self.clock.clock_state()
    }

    pub fn snapshot(&self) -> ClockSnapshot {
        self.clock.snapshot()
    }

    /// Shared clock handle for read-only display threads.
    pub fn clock(&self) -> Arc<GameClock> {
        Arc::clone(&self.clock)
    }

    pub fn engine(&self) -> &RulesEngine {
        &self.engine
    }

    pub fn history(&self) -> &[PlayRecord] {
        self.processor.history()
    }

    /// JSON rendering of the combined state for display hosts.
    pub fn state_json(&self) -> Result<String> {
        let view = GameStateView {
            clock: self.clock.snapshot(),
            situation: self.situation(),
        };
        Ok(serde_json::to_string(&view)?)
    }
}
