//! Statistics module for Pomodoro
//!
//! Aggregates the session log into focus/break totals, a per-day histogram
//! of focus sessions and per-task focus totals.

mod aggregate;

pub use aggregate::{
    aggregate, DailyAverages, DailyFocus, StatsSummary, TaskFocus, Timeframe,
};
