//! Game clock state machine
//!
//! `GameClock` is the authoritative owner of the two clocks: game time within
//! the current period and the play clock. One instance exists per game; every
//! mutation and every multi-field read goes through a single mutex, no
//! sub-locks.
//!
//! The clock does not decide rules. It executes `ClockDecision` instructions
//! from the rules engine (`apply_decision` is the single integration point)
//! and detects the one rule only it can see: the two-minute threshold
//! crossing during live time.
//!
//! ## Restart signals
//! A stoppage records how the game clock resumes. `ready_for_play()` is the
//! referee's signal: it arms the short play clock and restarts the game clock
//! for ready-restart stoppages. `snap()` retires the play clock and restarts
//! the game clock for snap-restart stoppages. The 40-second play clock arms
//! immediately when a decision is applied; the 25-second clock waits for the
//! ready signal.

use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::config::ClockConfig;
use crate::error::{ClockError, ConfigError};
use crate::rules::{ClockDecision, ClockStoppingReason, PlayClockDuration, RestartPolicy};
use crate::situation::{GameSituation, Quarter};

/// Game clock lifecycle within one period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClockState {
    Stopped,
    Running,
    /// Period time has reached zero. Terminal for the quarter; left only by
    /// `advance_quarter` (or a granted untimed down).
    Expired,
}

/// Play clock lifecycle between snaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayClockState {
    Inactive,
    Active,
    /// Entered automatically at the configured threshold; never set by
    /// callers.
    Warning,
    Expired,
}

/// What a tick observed. The host reacts (e.g. a play-clock expiry is a
/// delay-of-game candidate); the clock has already applied the transitions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickEvents {
    pub two_minute_warning: bool,
    pub quarter_expired: bool,
    pub play_clock_warning: bool,
    pub play_clock_expired: bool,
}

/// Consistent multi-field view taken under one lock acquisition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockSnapshot {
    pub quarter: Quarter,
    pub time_remaining_secs: u32,
    pub clock_state: ClockState,
    pub play_clock_secs: u32,
    pub play_clock_state: PlayClockState,
    pub play_clock_duration: PlayClockDuration,
    pub clock_speed: f64,
    pub two_minute_warning_given: [bool; 2],
}

/// Mutable clock state. Only touched while the mutex is held.
#[derive(Debug)]
struct ClockCore {
    quarter: Quarter,
    /// Seconds remaining in the period. Fractional to honor scaled ticks.
    time_remaining: f64,
    clock_state: ClockState,
    play_clock: f64,
    play_clock_state: PlayClockState,
    play_clock_duration: PlayClockDuration,
    clock_speed: f64,
    /// Two-minute warning given, per half.
    two_minute_warning_given: [bool; 2],
    /// How the game clock resumes after the current stoppage.
    pending_restart: Option<RestartPolicy>,
}

/// Authoritative owner of game time. `Send + Sync`; share via `Arc`.
pub struct GameClock {
    config: ClockConfig,
    core: Mutex<ClockCore>,
}

impl GameClock {
    pub fn new(config: ClockConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let core = ClockCore {
            quarter: Quarter::First,
            time_remaining: f64::from(config.quarter_length_secs),
            clock_state: ClockState::Stopped,
            play_clock: 0.0,
            play_clock_state: PlayClockState::Inactive,
            play_clock_duration: PlayClockDuration::Normal40,
            clock_speed: config.default_clock_speed,
            two_minute_warning_given: [false; 2],
            pending_restart: None,
        };
        Ok(Self {
            config,
            core: Mutex::new(core),
        })
    }

    pub fn config(&self) -> &ClockConfig {
        &self.config
    }

    /// A panicking reader cannot corrupt invariants only writers maintain, so
    /// a poisoned lock is recovered rather than propagated; any damage is
    /// repaired through `reset_to_valid_state`.
    fn lock(&self) -> MutexGuard<'_, ClockCore> {
        self.core.lock().unwrap_or_else(|poisoned| {
            log::warn!("game clock lock poisoned; recovering inner state");
            poisoned.into_inner()
        })
    }

    // ========================================================================
    // Game clock transitions
    // ========================================================================

    pub fn start(&self) -> Result<(), ClockError> {
        let mut core = self.lock();
        match core.clock_state {
            ClockState::Running => Err(ClockError::AlreadyRunning),
            ClockState::Expired => Err(ClockError::QuarterExpired),
            ClockState::Stopped => {
                core.clock_state = ClockState::Running;
                core.pending_restart = None;
                Ok(())
            }
        }
    }

    pub fn stop(&self) -> Result<(), ClockError> {
        let mut core = self.lock();
        match core.clock_state {
            ClockState::Stopped => Err(ClockError::AlreadyStopped),
            ClockState::Expired => Err(ClockError::QuarterExpired),
            ClockState::Running => {
                core.clock_state = ClockState::Stopped;
                Ok(())
            }
        }
    }

    /// Advance both clocks by `delta` seconds of host time, scaled by the
    /// clock speed. Valid while either clock runs; `tick(0.0)` changes
    /// nothing.
    pub fn tick(&self, delta: f64) -> Result<TickEvents, ClockError> {
        if !delta.is_finite() || delta < 0.0 {
            return Err(ClockError::InvalidTickDelta(delta));
        }

        let mut core = self.lock();
        let game_running = core.clock_state == ClockState::Running;
        let play_running = matches!(
            core.play_clock_state,
            PlayClockState::Active | PlayClockState::Warning
        );
        if !game_running && !play_running {
            return Err(ClockError::NothingRunning);
        }

        let scaled = delta * core.clock_speed;
        let mut events = TickEvents::default();

        if game_running {
            let before = core.time_remaining;
            let after = (before - scaled).max(0.0);

            if self.crosses_two_minute(&core, before, after) {
                // Stop exactly at the threshold; the remainder of the tick is
                // absorbed by the stoppage.
                let threshold = f64::from(self.config.two_minute_warning_secs);
                core.time_remaining = threshold;
                core.clock_state = ClockState::Stopped;
                let half = core.quarter.half().flag_index();
                core.two_minute_warning_given[half] = true;
                core.pending_restart = Some(RestartPolicy::OnSnap);
                core.play_clock_duration = PlayClockDuration::Short25;
                core.play_clock_state = PlayClockState::Inactive;
                events.two_minute_warning = true;
                log::info!("two-minute warning, {:?}", core.quarter);
            } else {
                core.time_remaining = after;
                if after == 0.0 {
                    core.clock_state = ClockState::Expired;
                    events.quarter_expired = true;
                    log::debug!("period time expired, {:?}", core.quarter);
                }
            }
        }

        if play_running {
            let after = (core.play_clock - scaled).max(0.0);
            core.play_clock = after;
            if after == 0.0 {
                if core.play_clock_state != PlayClockState::Expired {
                    core.play_clock_state = PlayClockState::Expired;
                    events.play_clock_expired = true;
                }
            } else if after <= f64::from(self.config.play_clock_warning_secs) {
                if core.play_clock_state == PlayClockState::Active {
                    core.play_clock_state = PlayClockState::Warning;
                    events.play_clock_warning = true;
                }
            }
        }

        Ok(events)
    }

    fn crosses_two_minute(&self, core: &ClockCore, before: f64, after: f64) -> bool {
        let threshold = f64::from(self.config.two_minute_warning_secs);
        self.config.two_minute_warning_enabled
            && core.quarter.has_two_minute_warning()
            && !core.two_minute_warning_given[core.quarter.half().flag_index()]
            && before > threshold
            && after <= threshold
    }

    // ========================================================================
    // Decision application
    // ========================================================================

    /// Apply a rules-engine decision atomically: stop or keep the game
    /// clock, deduct a runoff, arm the play clock, record the restart mode
    /// and perform two-minute bookkeeping.
    ///
    /// A granted untimed down returns an expired period to `Stopped` so one
    /// more snap can occur at 0:00.
    pub fn apply_decision(&self, decision: &ClockDecision) -> Result<(), ClockError> {
        let mut core = self.lock();

        if decision.runoff_seconds > 0 {
            let deducted = f64::from(decision.runoff_seconds).min(core.time_remaining);
            core.time_remaining -= deducted;
            log::info!(
                "runoff: {:.0}s deducted, {:.0}s remain",
                deducted,
                core.time_remaining
            );
        }

        if decision.grant_untimed_down {
            core.time_remaining = 0.0;
            core.clock_state = ClockState::Stopped;
            core.pending_restart = None;
        } else if decision.should_stop {
            core.clock_state = if core.time_remaining == 0.0 {
                ClockState::Expired
            } else {
                ClockState::Stopped
            };
            core.pending_restart = if decision.restart_on_snap {
                Some(RestartPolicy::OnSnap)
            } else if decision.restart_on_ready {
                Some(RestartPolicy::OnReady)
            } else {
                None
            };
        } else if core.time_remaining == 0.0 && core.clock_state == ClockState::Running {
            core.clock_state = ClockState::Expired;
        }

        if decision.stop_reason == Some(ClockStoppingReason::TwoMinuteWarning) {
            let half = core.quarter.half().flag_index();
            if core.two_minute_warning_given[half] {
                log::warn!("two-minute warning decision for a half that already had one");
            }
            core.two_minute_warning_given[half] = true;
        }

        core.play_clock_duration = decision.play_clock_duration;
        match decision.play_clock_duration {
            // The 40-second clock starts the moment the previous play ends.
            PlayClockDuration::Normal40 if core.clock_state != ClockState::Expired => {
                core.play_clock = f64::from(decision.play_clock_duration.seconds(&self.config));
                core.play_clock_state = PlayClockState::Active;
            }
            // The short clock waits for the ready-for-play signal.
            _ => {
                core.play_clock = 0.0;
                core.play_clock_state = PlayClockState::Inactive;
            }
        }

        log::debug!(
            "decision applied: stop={} reason={:?} state={:?} restart={:?}",
            decision.should_stop,
            decision.stop_reason,
            core.clock_state,
            core.pending_restart
        );
        Ok(())
    }

    /// Referee's ready-for-play signal: arms an inactive play clock and
    /// restarts the game clock after ready-restart stoppages.
    pub fn ready_for_play(&self) -> Result<(), ClockError> {
        let mut core = self.lock();
        if core.clock_state == ClockState::Expired {
            return Err(ClockError::QuarterExpired);
        }
        if core.play_clock_state == PlayClockState::Inactive {
            core.play_clock = f64::from(core.play_clock_duration.seconds(&self.config));
            core.play_clock_state = PlayClockState::Active;
        }
        if core.pending_restart == Some(RestartPolicy::OnReady)
            && core.clock_state == ClockState::Stopped
            && core.time_remaining > 0.0
        {
            core.clock_state = ClockState::Running;
            core.pending_restart = None;
        }
        Ok(())
    }

    /// Ball snapped: retires the play clock and restarts the game clock
    /// after snap-restart stoppages. Valid at 0:00 only for an untimed down
    /// (period not expired).
    pub fn snap(&self) -> Result<(), ClockError> {
        let mut core = self.lock();
        if core.clock_state == ClockState::Expired {
            return Err(ClockError::QuarterExpired);
        }
        core.play_clock = 0.0;
        core.play_clock_state = PlayClockState::Inactive;
        if core.pending_restart == Some(RestartPolicy::OnSnap)
            && core.clock_state == ClockState::Stopped
            && core.time_remaining > 0.0
        {
            core.clock_state = ClockState::Running;
        }
        core.pending_restart = None;
        Ok(())
    }

    /// Explicitly arm the play clock with a duration (kickoffs, free kicks
    /// and other administrations outside a decision).
    pub fn start_play_clock(&self, duration: PlayClockDuration) -> Result<(), ClockError> {
        let mut core = self.lock();
        if core.clock_state == ClockState::Expired {
            return Err(ClockError::QuarterExpired);
        }
        core.play_clock_duration = duration;
        core.play_clock = f64::from(duration.seconds(&self.config));
        core.play_clock_state = PlayClockState::Active;
        Ok(())
    }

    // ========================================================================
    // Period transitions
    // ========================================================================

    /// Move to the next period. The only exit from `Expired`.
    pub fn advance_quarter(&self) -> Result<Quarter, ClockError> {
        let mut core = self.lock();
        if core.clock_state != ClockState::Expired {
            return Err(ClockError::QuarterNotExpired);
        }
        let next = core.quarter.next();
        core.quarter = next;
        core.time_remaining = f64::from(self.config.period_length_secs(next.is_overtime()));
        core.clock_state = ClockState::Stopped;
        core.play_clock = 0.0;
        core.play_clock_state = PlayClockState::Inactive;
        core.play_clock_duration = PlayClockDuration::Short25;
        core.pending_restart = None;
        log::info!("advanced to {:?}", next);
        Ok(next)
    }

    pub fn set_clock_speed(&self, multiplier: f64) -> Result<(), ClockError> {
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return Err(ClockError::InvalidClockSpeed(multiplier));
        }
        self.lock().clock_speed = multiplier;
        Ok(())
    }

    // ========================================================================
    // Recovery
    // ========================================================================

    /// Repair any corrupted field combination back to a configuration-derived
    /// valid state without discarding the game in progress. Returns the
    /// number of repairs made.
    pub fn reset_to_valid_state(&self) -> usize {
        let mut core = self.lock();
        let mut repairs = 0;

        let period = f64::from(self.config.period_length_secs(core.quarter.is_overtime()));
        if !core.time_remaining.is_finite() || core.time_remaining < 0.0 {
            core.time_remaining = 0.0;
            repairs += 1;
        }
        if core.time_remaining > period {
            core.time_remaining = period;
            repairs += 1;
        }
        if core.clock_state == ClockState::Expired && core.time_remaining > 0.0 {
            core.clock_state = ClockState::Stopped;
            repairs += 1;
        }
        if core.clock_state == ClockState::Running && core.time_remaining == 0.0 {
            core.clock_state = ClockState::Expired;
            repairs += 1;
        }

        let duration = f64::from(core.play_clock_duration.seconds(&self.config));
        if !core.play_clock.is_finite() || core.play_clock < 0.0 {
            core.play_clock = 0.0;
            repairs += 1;
        }
        if core.play_clock > duration {
            core.play_clock = duration;
            repairs += 1;
        }
        let threshold = f64::from(self.config.play_clock_warning_secs);
        match core.play_clock_state {
            PlayClockState::Active if core.play_clock > 0.0 && core.play_clock <= threshold => {
                core.play_clock_state = PlayClockState::Warning;
                repairs += 1;
            }
            PlayClockState::Warning if core.play_clock > threshold => {
                core.play_clock_state = PlayClockState::Active;
                repairs += 1;
            }
            PlayClockState::Active | PlayClockState::Warning if core.play_clock == 0.0 => {
                core.play_clock_state = PlayClockState::Expired;
                repairs += 1;
            }
            PlayClockState::Expired if core.play_clock > 0.0 => {
                core.play_clock = 0.0;
                repairs += 1;
            }
            _ => {}
        }

        if !core.clock_speed.is_finite() || core.clock_speed <= 0.0 {
            core.clock_speed = self.config.default_clock_speed;
            repairs += 1;
        }

        if repairs > 0 {
            log::warn!("clock state repaired: {} field(s)", repairs);
        }
        repairs
    }

    /// Consistency repair: copy the clock's authoritative quarter, time and
    /// warning bookkeeping into a situation that drifted from it.
    pub fn sync_situation(&self, situation: &mut GameSituation) {
        let core = self.lock();
        situation.quarter = core.quarter;
        situation.time_remaining = core.time_remaining.ceil() as u32;
        situation.two_minute_warning_given =
            core.two_minute_warning_given[core.quarter.half().flag_index()];
    }

    // ========================================================================
    // Reads (all routed through the lock)
    // ========================================================================

    pub fn snapshot(&self) -> ClockSnapshot {
        let core = self.lock();
        ClockSnapshot {
            quarter: core.quarter,
            time_remaining_secs: core.time_remaining.ceil() as u32,
            clock_state: core.clock_state,
            play_clock_secs: core.play_clock.ceil() as u32,
            play_clock_state: core.play_clock_state,
            play_clock_duration: core.play_clock_duration,
            clock_speed: core.clock_speed,
            two_minute_warning_given: core.two_minute_warning_given,
        }
    }

    pub fn time_remaining_secs(&self) -> u32 {
        self.lock().time_remaining.ceil() as u32
    }

    pub fn quarter(&self) -> Quarter {
        self.lock().quarter
    }

    pub fn clock_state(&self) -> ClockState {
        self.lock().clock_state
    }

    pub fn play_clock_secs(&self) -> u32 {
        self.lock().play_clock.ceil() as u32
    }

    pub fn play_clock_state(&self) -> PlayClockState {
        self.lock().play_clock_state
    }

    pub fn clock_speed(&self) -> f64 {
        self.lock().clock_speed
    }
}
