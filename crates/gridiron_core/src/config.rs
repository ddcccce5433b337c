//! Clock configuration
//!
//! All timing constants live here so rule variants (regular season, playoff,
//! preseason) are presets over one struct instead of scattered tuning knobs.
//!
//! The config is validated once at construction and injected immutably into
//! `GameClock` and `RulesEngine`; invalid combinations are rejected up front,
//! never at use.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Immutable timing configuration for one game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockConfig {
    /// Length of each regulation quarter, in seconds.
    pub quarter_length_secs: u32,
    /// Length of an overtime period, in seconds.
    pub overtime_length_secs: u32,
    /// Normal play clock (runs after an ordinary play), in seconds.
    pub play_clock_normal_secs: u32,
    /// Short play clock (runs after administrative stoppages), in seconds.
    pub play_clock_short_secs: u32,
    /// Remaining play-clock seconds at which the warning state is entered.
    pub play_clock_warning_secs: u32,
    /// Whether the two-minute warning stoppage is in effect.
    pub two_minute_warning_enabled: bool,
    /// Game-clock seconds remaining that trigger the two-minute warning.
    pub two_minute_warning_secs: u32,
    /// Playoff timing rules (no ties; longer overtime).
    pub playoff_rules: bool,
    /// Team timeouts allotted per half.
    pub timeouts_per_half: u8,
    /// Team timeouts allotted per overtime period.
    pub overtime_timeouts: u8,
    /// Simulation speed multiplier applied to tick deltas.
    pub default_clock_speed: f64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self::regular_season()
    }
}

impl ClockConfig {
    /// Regular-season rules: 15-minute quarters, 10-minute overtime, ties
    /// permitted.
    pub fn regular_season() -> Self {
        Self {
            quarter_length_secs: 15 * 60,
            overtime_length_secs: 10 * 60,
            play_clock_normal_secs: 40,
            play_clock_short_secs: 25,
            play_clock_warning_secs: 10,
            two_minute_warning_enabled: true,
            two_minute_warning_secs: 120,
            playoff_rules: false,
            timeouts_per_half: 3,
            overtime_timeouts: 2,
            default_clock_speed: 1.0,
        }
    }

    /// Playoff rules: 15-minute overtime periods until a winner emerges.
    pub fn playoff() -> Self {
        let mut cfg = Self::regular_season();
        cfg.overtime_length_secs = 15 * 60;
        cfg.playoff_rules = true;
        cfg.overtime_timeouts = 3;
        cfg
    }

    /// Preseason rules: shorter overtime, no overtime win requirement.
    pub fn preseason() -> Self {
        let mut cfg = Self::regular_season();
        cfg.overtime_length_secs = 0;
        cfg.two_minute_warning_enabled = true;
        cfg
    }

    /// Parse and validate a config from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject invalid combinations at construction, not at use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.quarter_length_secs == 0 {
            return Err(ConfigError::ZeroQuarterLength);
        }
        if self.playoff_rules && self.overtime_length_secs == 0 {
            return Err(ConfigError::PlayoffWithoutOvertime);
        }
        if self.play_clock_short_secs > self.play_clock_normal_secs {
            return Err(ConfigError::ShortExceedsNormal {
                short: self.play_clock_short_secs,
                normal: self.play_clock_normal_secs,
            });
        }
        if self.play_clock_warning_secs >= self.play_clock_short_secs {
            return Err(ConfigError::WarningThresholdTooLarge {
                threshold: self.play_clock_warning_secs,
                short: self.play_clock_short_secs,
            });
        }
        if self.two_minute_warning_enabled
            && self.two_minute_warning_secs >= self.quarter_length_secs
        {
            return Err(ConfigError::TwoMinuteExceedsQuarter {
                threshold: self.two_minute_warning_secs,
                quarter: self.quarter_length_secs,
            });
        }
        if !self.default_clock_speed.is_finite() || self.default_clock_speed <= 0.0 {
            return Err(ConfigError::InvalidClockSpeed(self.default_clock_speed));
        }
        Ok(())
    }

    /// Period length for a given quarter (regulation vs. overtime).
    pub fn period_length_secs(&self, overtime: bool) -> u32 {
        if overtime {
            self.overtime_length_secs
        } else {
            self.quarter_length_secs
        }
    }
}
