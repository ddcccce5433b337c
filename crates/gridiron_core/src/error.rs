use thiserror::Error;

use crate::situation::TeamId;

/// Configuration rejected at construction time.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("quarter length must be positive")]
    ZeroQuarterLength,

    #[error("playoff rules require a non-zero overtime length")]
    PlayoffWithoutOvertime,

    #[error("short play clock ({short}s) must not exceed the normal play clock ({normal}s)")]
    ShortExceedsNormal { short: u32, normal: u32 },

    #[error("play clock warning threshold ({threshold}s) must be below the short play clock ({short}s)")]
    WarningThresholdTooLarge { threshold: u32, short: u32 },

    #[error("two-minute warning threshold ({threshold}s) must be below the quarter length ({quarter}s)")]
    TwoMinuteExceedsQuarter { threshold: u32, quarter: u32 },

    #[error("default clock speed must be finite and positive: {0}")]
    InvalidClockSpeed(f64),

    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Malformed game situation rejected before it reaches the rules engine.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SituationError {
    #[error("down {0} out of range (1-4)")]
    DownOutOfRange(u8),

    #[error("distance {0} yards exceeds the field")]
    DistanceTooLarge(u16),

    #[error("time remaining {time}s exceeds the period length {period}s")]
    TimeExceedsPeriod { time: u32, period: u32 },
}

/// Invalid clock state transition or tick.
#[derive(Error, Debug, PartialEq)]
pub enum ClockError {
    #[error("clock is already running")]
    AlreadyRunning,

    #[error("clock is already stopped")]
    AlreadyStopped,

    #[error("quarter has expired; advance the quarter to continue")]
    QuarterExpired,

    #[error("quarter has not expired yet")]
    QuarterNotExpired,

    #[error("neither the game clock nor the play clock is running")]
    NothingRunning,

    #[error("tick delta must be finite and non-negative: {0}")]
    InvalidTickDelta(f64),

    #[error("clock speed must be finite and positive: {0}")]
    InvalidClockSpeed(f64),

    #[error("game is over; no further quarters")]
    GameOver,
}

/// Rule violation surfaced by the rules engine.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RulesError {
    #[error(transparent)]
    InvalidSituation(#[from] SituationError),

    #[error("{team:?} has no timeouts remaining this period")]
    NoTimeoutsRemaining { team: TeamId },

    #[error("cannot advance past a finished game")]
    GameAlreadyOver,
}

/// Umbrella error for the host-facing session API.
#[derive(Error, Debug)]
pub enum GameClockError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Clock(#[from] ClockError),

    #[error(transparent)]
    Rules(#[from] RulesError),

    #[error(transparent)]
    Situation(#[from] SituationError),

    #[error("snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GameClockError {
    /// Whether the host can retry the call after repairing state.
    ///
    /// State errors are recoverable through `reset_to_valid_state` or by
    /// simply issuing the correct transition; config and input errors need a
    /// corrected value from the caller.
    pub fn is_recoverable(&self) -> bool {
        match self {
            GameClockError::Clock(_) => true,
            GameClockError::Rules(RulesError::NoTimeoutsRemaining { .. }) => true,
            GameClockError::Rules(_) => false,
            GameClockError::Config(_) => false,
            GameClockError::Situation(_) => false,
            GameClockError::Serialization(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, GameClockError>;
