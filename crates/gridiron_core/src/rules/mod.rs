//! NFL timing rules: outcome vocabulary and the decision engine.

mod engine;
mod types;

pub use engine::{PeriodOutcome, RulesEngine};
pub use types::{
    ClockDecision, ClockStoppingReason, DecisionStats, PenaltyInfo, PenaltyKind,
    PlayClockDuration, PlayOutcome, PlayType, RestartPolicy, ScoreType, TurnoverType,
};
