//! # gridiron_core - NFL Game Clock & Timing Rules Engine
//!
//! This library models the timing logic of an American-football game: the
//! game clock, the play clock, and the NFL rules that decide when each clock
//! starts, stops or resets. It owns no rendering, persistence or networking;
//! a host simulation or broadcast-display application drives it.
//!
//! ## Architecture
//! - [`rules::RulesEngine`] - pure decision function over a game situation
//! - [`processor::PlayOutcomeProcessor`] - play results in, clock decisions
//!   and updated situations out
//! - [`clock::GameClock`] - mutex-guarded owner of both clocks
//! - [`session::GameSession`] - the host facade composing all three
//!
//! ## Example
//! ```
//! use gridiron_core::{ClockConfig, GameSession, PlayOutcome, PlayType};
//!
//! let mut session = GameSession::with_seed(ClockConfig::default(), 42).unwrap();
//! session.start().unwrap();
//! session.tick(7.0).unwrap();
//!
//! let decision = session
//!     .process_play(&PlayOutcome::incomplete_pass(PlayType::ShortPass))
//!     .unwrap();
//! assert!(decision.should_stop);
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod format;
pub mod processor;
pub mod rng;
pub mod rules;
pub mod session;
pub mod situation;

#[cfg(test)]
mod scenario_tests;

// Re-export the host-facing API surface.
pub use clock::{ClockSnapshot, ClockState, GameClock, PlayClockState, TickEvents};
pub use config::ClockConfig;
pub use error::{ClockError, ConfigError, GameClockError, Result, RulesError, SituationError};
pub use processor::{PlayOutcomeProcessor, PlayRecord};
pub use rng::{NoRandomness, OutcomeRng, SeededOutcomeRng};
pub use rules::{
    ClockDecision, ClockStoppingReason, PenaltyInfo, PenaltyKind, PeriodOutcome,
    PlayClockDuration, PlayOutcome, PlayType, RestartPolicy, RulesEngine, ScoreType,
    TurnoverType,
};
pub use session::{GameSession, GameStateView};
pub use situation::{GameSituation, Half, Quarter, TeamId};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
