mod config;
mod engine;

pub use config::{Phase, TimerConfig};
pub use engine::{format_mm_ss, PhaseCompletion, TimerEngine};
