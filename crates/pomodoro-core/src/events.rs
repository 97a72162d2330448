use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::Phase;

/// Every timer state change produces an Event.
/// Views render them; the controller turns some of them into cues and notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        phase: Phase,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        phase: Phase,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// A phase ran down to zero.
    PhaseCompleted {
        phase: Phase,
        completed_focus_count: u32,
        at: DateTime<Utc>,
    },
    /// The engine moved into a new phase, either by completion or by `change_mode`.
    PhaseChanged {
        from: Phase,
        to: Phase,
        duration_secs: u64,
        running: bool,
        at: DateTime<Utc>,
    },
    TimerReset {
        phase: Phase,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    ConfigUpdated {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: Phase,
        phase_label: String,
        running: bool,
        remaining_secs: u64,
        total_secs: u64,
        progress_pct: f64,
        completed_focus_count: u32,
        current_task_id: Option<String>,
        at: DateTime<Utc>,
    },
}
