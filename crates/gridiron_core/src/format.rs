//! Display formatting
//!
//! Stateless string rendering over the numeric getters. Every function
//! composes its output in a single pass into a fresh `String`; nothing here
//! writes into storage that aliases an input.

use std::fmt::Write as _;

use crate::clock::ClockSnapshot;
use crate::situation::{GameSituation, Quarter};

/// "M:SS" game-clock rendering, e.g. `14:05`.
pub fn format_game_clock(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Play clock renders as bare seconds, e.g. `:08`.
pub fn format_play_clock(secs: u32) -> String {
    format!(":{:02}", secs)
}

/// "Q1".."Q4", "OT", "2OT", ...
pub fn format_quarter(quarter: Quarter) -> String {
    match quarter {
        Quarter::First => "Q1".to_string(),
        Quarter::Second => "Q2".to_string(),
        Quarter::Third => "Q3".to_string(),
        Quarter::Fourth => "Q4".to_string(),
        Quarter::Overtime(1) => "OT".to_string(),
        Quarter::Overtime(n) => format!("{}OT", n),
    }
}

/// "1st & 10", "3rd & 7", "2nd & Goal".
pub fn format_down_distance(down: u8, distance: u16) -> String {
    let ordinal = match down {
        1 => "1st",
        2 => "2nd",
        3 => "3rd",
        _ => "4th",
    };
    if distance == 0 {
        format!("{} & Goal", ordinal)
    } else {
        format!("{} & {}", ordinal, distance)
    }
}

/// One-line scoreboard status, e.g. `Q4 2:00 | 3rd & 7 | play clock :25`.
pub fn format_status_line(snapshot: &ClockSnapshot, situation: &GameSituation) -> String {
    let mut line = String::with_capacity(48);
    let _ = write!(
        line,
        "{} {} | {} | play clock {}",
        format_quarter(snapshot.quarter),
        format_game_clock(snapshot.time_remaining_secs),
        format_down_distance(situation.down, situation.distance),
        format_play_clock(snapshot.play_clock_secs),
    );
    line
}
