//! Game situation types
//!
//! `GameSituation` is the minimal set of facts needed to decide clock
//! behavior for the next play. It is owned by the `PlayOutcomeProcessor` and
//! mutated only between plays; the rules engine reads it and returns
//! instructions without ever mutating it.

use serde::{Deserialize, Serialize};

use crate::config::ClockConfig;
use crate::error::SituationError;

/// Longest possible yards-to-go (own goal line to the opposite goal line).
const MAX_DISTANCE_YARDS: u16 = 99;

/// Team identifier (home = true, away = false)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TeamId(pub bool);

impl TeamId {
    pub const HOME: Self = Self(true);
    pub const AWAY: Self = Self(false);

    pub fn is_home(self) -> bool {
        self.0
    }

    pub fn opponent(self) -> Self {
        Self(!self.0)
    }

    /// Index into per-team arrays (home = 0, away = 1).
    pub fn index(self) -> usize {
        if self.0 {
            0
        } else {
            1
        }
    }
}

/// Half of the game, used for per-half bookkeeping (two-minute warning,
/// timeout allotments).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Half {
    First,
    Second,
    Overtime,
}

impl Half {
    /// Index into per-half flag arrays. Overtime shares the second-half slot;
    /// there is no two-minute warning in overtime.
    pub fn flag_index(self) -> usize {
        match self {
            Half::First => 0,
            Half::Second | Half::Overtime => 1,
        }
    }
}

/// Game period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quarter {
    First,
    Second,
    Third,
    Fourth,
    /// Overtime period number, starting at 1.
    Overtime(u8),
}

impl Default for Quarter {
    fn default() -> Self {
        Quarter::First
    }
}

impl Quarter {
    pub fn half(self) -> Half {
        match self {
            Quarter::First | Quarter::Second => Half::First,
            Quarter::Third | Quarter::Fourth => Half::Second,
            Quarter::Overtime(_) => Half::Overtime,
        }
    }

    pub fn is_overtime(self) -> bool {
        matches!(self, Quarter::Overtime(_))
    }

    /// The quarter whose end triggers the two-minute warning for its half.
    pub fn has_two_minute_warning(self) -> bool {
        matches!(self, Quarter::Second | Quarter::Fourth)
    }

    /// The period that follows in normal progression. `Fourth` maps to the
    /// first overtime period; whether overtime is actually played is the
    /// rules engine's call.
    pub fn next(self) -> Quarter {
        match self {
            Quarter::First => Quarter::Second,
            Quarter::Second => Quarter::Third,
            Quarter::Third => Quarter::Fourth,
            Quarter::Fourth => Quarter::Overtime(1),
            Quarter::Overtime(n) => Quarter::Overtime(n.saturating_add(1)),
        }
    }
}

/// Facts about the game needed to decide clock behavior for the next play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSituation {
    /// Current down, 1-4.
    pub down: u8,
    /// Yards to go for a first down; 0 means goal-to-go.
    pub distance: u16,
    pub quarter: Quarter,
    /// Game-clock seconds remaining in the current period.
    pub time_remaining: u32,
    /// Team with the ball.
    pub possession: TeamId,
    /// Playoff timing rules in effect.
    pub playoff_rules: bool,
    /// Whether an untimed down may still be granted this period.
    pub untimed_down_available: bool,
    /// Whether the current half's two-minute warning has been given.
    /// Authoritative copy lives on the clock; synced between plays.
    pub two_minute_warning_given: bool,
    /// Timeouts remaining this period, indexed by `TeamId::index()`.
    pub timeouts_remaining: [u8; 2],
}

impl GameSituation {
    /// Opening situation for a game under the given config.
    pub fn opening(config: &ClockConfig) -> Self {
        Self {
            down: 1,
            distance: 10,
            quarter: Quarter::First,
            time_remaining: config.quarter_length_secs,
            possession: TeamId::HOME,
            playoff_rules: config.playoff_rules,
            untimed_down_available: true,
            two_minute_warning_given: false,
            timeouts_remaining: [config.timeouts_per_half; 2],
        }
    }

    /// Reject malformed situations rather than silently clamping.
    pub fn validate(&self, config: &ClockConfig) -> Result<(), SituationError> {
        if self.down == 0 || self.down > 4 {
            return Err(SituationError::DownOutOfRange(self.down));
        }
        if self.distance > MAX_DISTANCE_YARDS {
            return Err(SituationError::DistanceTooLarge(self.distance));
        }
        let period = config.period_length_secs(self.quarter.is_overtime());
        if self.time_remaining > period {
            return Err(SituationError::TimeExceedsPeriod {
                time: self.time_remaining,
                period,
            });
        }
        Ok(())
    }

    pub fn timeouts_for(&self, team: TeamId) -> u8 {
        self.timeouts_remaining[team.index()]
    }

    /// Inside the two-minute window of a half that has one.
    pub fn in_two_minute_window(&self, config: &ClockConfig) -> bool {
        self.quarter.has_two_minute_warning()
            && self.time_remaining <= config.two_minute_warning_secs
    }
}
