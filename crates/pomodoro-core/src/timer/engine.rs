//! Timer engine implementation.
//!
//! The timer engine is a tick-driven state machine. It does not own a clock
//! or a thread - the caller invokes `tick()` once per elapsed second while the
//! timer is running (see [`crate::ticker`]).
//!
//! ## Phase Transitions
//!
//! ```text
//! Focus -> ShortBreak -> Focus -> ... -> Focus -> LongBreak -> Focus
//!                            (every `long_break_interval`-th focus)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(TimerConfig::default());
//! engine.start();
//! // Once per second:
//! if let Some(done) = engine.tick(current_task) { /* record, notify */ }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::config::{Phase, TimerConfig};
use crate::events::Event;
use crate::history::SessionRecord;

/// Outcome of a phase running down to zero.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseCompletion {
    pub completed: Phase,
    pub next: Phase,
    /// Whether the next phase was auto-started.
    pub running: bool,
    pub completed_focus_count: u32,
    pub record: SessionRecord,
    pub at: DateTime<Utc>,
}

impl PhaseCompletion {
    pub fn events(&self, next_duration_secs: u64) -> Vec<Event> {
        vec![
            Event::PhaseCompleted {
                phase: self.completed,
                completed_focus_count: self.completed_focus_count,
                at: self.at,
            },
            Event::PhaseChanged {
                from: self.completed,
                to: self.next,
                duration_secs: next_duration_secs,
                running: self.running,
                at: self.at,
            },
        ]
    }
}

/// Core timer engine.
///
/// Holds the transient timer state plus the configuration it is derived from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerEngine {
    config: TimerConfig,
    phase: Phase,
    remaining_secs: u64,
    running: bool,
    completed_focus_count: u32,
    /// When the current phase's running period began. Cleared by reset,
    /// mode changes and completion.
    #[serde(default)]
    phase_started_at: Option<DateTime<Utc>>,
}

impl TimerEngine {
    /// Create an engine in `Focus`, paused, with the full focus duration remaining.
    pub fn new(config: TimerConfig) -> Self {
        let config = config.normalized();
        Self {
            remaining_secs: config.focus_seconds,
            config,
            phase: Phase::Focus,
            running: false,
            completed_focus_count: 0,
            phase_started_at: None,
        }
    }

    /// Restore the persisted focus counter, so long-break routing survives a reload.
    pub fn with_completed_focus_count(mut self, count: u32) -> Self {
        self.completed_focus_count = count;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn completed_focus_count(&self) -> u32 {
        self.completed_focus_count
    }

    pub fn phase_started_at(&self) -> Option<DateTime<Utc>> {
        self.phase_started_at
    }

    pub fn total_secs(&self) -> u64 {
        self.config.duration_secs(self.phase)
    }

    /// 0.0 .. 100.0 progress within the current phase.
    pub fn progress_pct(&self) -> f64 {
        let total = self.total_secs();
        if total == 0 {
            return 0.0;
        }
        let elapsed = total.saturating_sub(self.remaining_secs);
        (elapsed as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
    }

    /// Remaining time as `MM:SS`.
    pub fn display(&self) -> String {
        format_mm_ss(self.remaining_secs)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self, current_task_id: Option<&str>) -> Event {
        Event::StateSnapshot {
            phase: self.phase,
            phase_label: self.phase.label().to_string(),
            running: self.running,
            remaining_secs: self.remaining_secs,
            total_secs: self.total_secs(),
            progress_pct: self.progress_pct(),
            completed_focus_count: self.completed_focus_count,
            current_task_id: current_task_id.map(str::to_string),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        self.start_at(Utc::now())
    }

    /// Start the countdown. No-op when already running or nothing remains.
    pub fn start_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if self.running || self.remaining_secs == 0 {
            return None;
        }
        self.running = true;
        if self.phase_started_at.is_none() {
            self.phase_started_at = Some(now);
        }
        Some(Event::TimerStarted {
            phase: self.phase,
            remaining_secs: self.remaining_secs,
            at: now,
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        if !self.running {
            return None;
        }
        self.running = false;
        Some(Event::TimerPaused {
            phase: self.phase,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Start when paused, pause when running.
    pub fn toggle(&mut self) -> Option<Event> {
        if self.running {
            self.pause()
        } else {
            self.start()
        }
    }

    /// Stop and restore the current phase's full duration.
    pub fn reset(&mut self) -> Event {
        self.running = false;
        self.phase_started_at = None;
        self.remaining_secs = self.total_secs();
        Event::TimerReset {
            phase: self.phase,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        }
    }

    /// Jump to `phase`, stopped, with its full duration.
    pub fn change_mode(&mut self, phase: Phase) -> Event {
        let from = self.phase;
        self.running = false;
        self.phase_started_at = None;
        self.phase = phase;
        self.remaining_secs = self.total_secs();
        Event::PhaseChanged {
            from,
            to: phase,
            duration_secs: self.remaining_secs,
            running: false,
            at: Utc::now(),
        }
    }

    /// Replace the configuration.
    ///
    /// When the active phase's duration changed, the remaining time is
    /// re-derived from the new duration, even mid-countdown.
    pub fn update_config(&mut self, config: TimerConfig) -> Event {
        let config = config.normalized();
        let old_total = self.total_secs();
        self.config = config;
        let new_total = self.total_secs();
        if new_total != old_total {
            tracing::debug!(phase = %self.phase, old_total, new_total, "active duration changed, re-deriving remaining time");
            self.remaining_secs = new_total;
        }
        Event::ConfigUpdated {
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        }
    }

    pub fn tick(&mut self, current_task: Option<&str>) -> Option<PhaseCompletion> {
        self.tick_at(Utc::now(), current_task)
    }

    /// Advance one second. Returns the completion when the phase hits zero.
    pub fn tick_at(
        &mut self,
        now: DateTime<Utc>,
        current_task: Option<&str>,
    ) -> Option<PhaseCompletion> {
        if !self.running {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs > 0 {
            return None;
        }
        Some(self.complete_phase(now, current_task))
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn complete_phase(&mut self, now: DateTime<Utc>, current_task: Option<&str>) -> PhaseCompletion {
        let completed = self.phase;
        let duration_seconds = self.total_secs();
        let start_time = self.phase_started_at.take().unwrap_or_else(|| {
            now - chrono::Duration::seconds(duration_seconds.min(i64::MAX as u64) as i64)
        });
        let record = SessionRecord {
            phase: completed,
            duration_seconds,
            start_time,
            end_time: now,
            task_id: current_task.map(str::to_string),
        };

        let (next, running) = match completed {
            Phase::Focus => {
                self.completed_focus_count = self.completed_focus_count.saturating_add(1);
                let next = if self.completed_focus_count % self.config.long_break_interval == 0 {
                    Phase::LongBreak
                } else {
                    Phase::ShortBreak
                };
                (next, self.config.auto_start_breaks)
            }
            Phase::ShortBreak | Phase::LongBreak => (Phase::Focus, self.config.auto_start_focus),
        };

        self.phase = next;
        self.remaining_secs = self.total_secs();
        self.running = running;
        if running {
            self.phase_started_at = Some(now);
        }
        tracing::info!(%completed, %next, running, count = self.completed_focus_count, "phase completed");

        PhaseCompletion {
            completed,
            next,
            running,
            completed_focus_count: self.completed_focus_count,
            record,
            at: now,
        }
    }
}

/// Format seconds as `MM:SS`; minutes are not wrapped into hours.
pub fn format_mm_ss(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn short_config() -> TimerConfig {
        TimerConfig {
            focus_seconds: 3,
            short_break_seconds: 2,
            long_break_seconds: 4,
            auto_start_breaks: true,
            auto_start_focus: true,
            long_break_interval: 2,
        }
    }

    fn run_out(engine: &mut TimerEngine) -> PhaseCompletion {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        loop {
            if let Some(done) = engine.tick_at(now, None) {
                return done;
            }
        }
    }

    #[test]
    fn starts_paused_in_focus() {
        let engine = TimerEngine::new(TimerConfig::default());
        assert_eq!(engine.phase(), Phase::Focus);
        assert_eq!(engine.remaining_secs(), 1500);
        assert!(!engine.is_running());
        assert_eq!(engine.completed_focus_count(), 0);
        assert_eq!(engine.display(), "25:00");
    }

    #[test]
    fn start_pause_toggle() {
        let mut engine = TimerEngine::new(TimerConfig::default());
        assert!(engine.start().is_some());
        assert!(engine.is_running());
        assert!(engine.start().is_none());

        assert!(engine.pause().is_some());
        assert!(!engine.is_running());
        assert!(engine.pause().is_none());

        assert!(matches!(engine.toggle(), Some(Event::TimerStarted { .. })));
        assert!(matches!(engine.toggle(), Some(Event::TimerPaused { .. })));
    }

    #[test]
    fn tick_is_noop_while_paused() {
        let mut engine = TimerEngine::new(short_config());
        assert!(engine.tick(None).is_none());
        assert_eq!(engine.remaining_secs(), 3);
    }

    #[test]
    fn focus_completion_routes_to_short_break_and_auto_starts() {
        let mut engine = TimerEngine::new(short_config());
        engine.start();
        assert!(engine.tick(None).is_none());
        assert!(engine.tick(None).is_none());
        let done = engine.tick(Some("task-1")).expect("phase should complete");

        assert_eq!(done.completed, Phase::Focus);
        assert_eq!(done.next, Phase::ShortBreak);
        assert!(done.running);
        assert_eq!(done.record.duration_seconds, 3);
        assert_eq!(done.record.task_id.as_deref(), Some("task-1"));
        assert_eq!(engine.phase(), Phase::ShortBreak);
        assert_eq!(engine.remaining_secs(), 2);
        assert_eq!(engine.completed_focus_count(), 1);
    }

    #[test]
    fn interval_th_focus_goes_to_long_break() {
        let mut engine = TimerEngine::new(short_config());
        engine.start();
        assert_eq!(run_out(&mut engine).next, Phase::ShortBreak);
        assert_eq!(run_out(&mut engine).next, Phase::Focus);
        let second = run_out(&mut engine);
        assert_eq!(second.next, Phase::LongBreak);
        assert_eq!(engine.remaining_secs(), 4);
    }

    #[test]
    fn auto_start_flags_control_running_after_completion() {
        let mut cfg = short_config();
        cfg.auto_start_breaks = false;
        cfg.auto_start_focus = false;
        let mut engine = TimerEngine::new(cfg);
        engine.start();
        let done = run_out(&mut engine);
        assert!(!done.running);
        assert!(!engine.is_running());
        assert!(engine.phase_started_at().is_none());

        engine.start();
        let done = run_out(&mut engine);
        assert_eq!(done.next, Phase::Focus);
        assert!(!engine.is_running());
    }

    #[test]
    fn record_start_time_is_when_running_began() {
        let mut engine = TimerEngine::new(short_config());
        let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        engine.start_at(t0);
        engine.pause();
        engine.start_at(t0 + chrono::Duration::seconds(30));
        let end = t0 + chrono::Duration::seconds(60);
        engine.tick_at(end, None);
        engine.tick_at(end, None);
        let done = engine.tick_at(end, None).unwrap();
        assert_eq!(done.record.start_time, t0);
        assert_eq!(done.record.end_time, end);
        // Auto-started break begins at the completion instant.
        assert_eq!(engine.phase_started_at(), Some(end));
    }

    #[test]
    fn reset_restores_duration_and_keeps_phase() {
        let mut engine = TimerEngine::new(short_config());
        engine.change_mode(Phase::LongBreak);
        engine.start();
        engine.tick(None);
        engine.reset();
        assert_eq!(engine.phase(), Phase::LongBreak);
        assert_eq!(engine.remaining_secs(), 4);
        assert!(!engine.is_running());
        assert!(engine.phase_started_at().is_none());
    }

    #[test]
    fn change_mode_stops_and_keeps_count() {
        let mut engine = TimerEngine::new(short_config()).with_completed_focus_count(5);
        engine.start();
        let event = engine.change_mode(Phase::ShortBreak);
        assert!(matches!(event, Event::PhaseChanged { to: Phase::ShortBreak, running: false, .. }));
        assert!(!engine.is_running());
        assert_eq!(engine.remaining_secs(), 2);
        assert_eq!(engine.completed_focus_count(), 5);
    }

    #[test]
    fn update_config_rederives_remaining_only_when_active_duration_changes() {
        let mut engine = TimerEngine::new(TimerConfig::default());
        engine.start();
        for _ in 0..100 {
            engine.tick(None);
        }
        assert_eq!(engine.remaining_secs(), 1400);

        let mut cfg = TimerConfig::default();
        cfg.short_break_seconds = 600;
        engine.update_config(cfg.clone());
        assert_eq!(engine.remaining_secs(), 1400);

        cfg.focus_seconds = 1800;
        engine.update_config(cfg);
        assert_eq!(engine.remaining_secs(), 1800);
        assert!(engine.is_running());
    }

    #[test]
    fn progress_and_snapshot() {
        let mut engine = TimerEngine::new(short_config());
        engine.start();
        engine.tick(None);
        assert!((engine.progress_pct() - 100.0 / 3.0).abs() < 1e-9);
        match engine.snapshot(Some("t")) {
            Event::StateSnapshot {
                phase,
                running,
                remaining_secs,
                total_secs,
                current_task_id,
                ..
            } => {
                assert_eq!(phase, Phase::Focus);
                assert!(running);
                assert_eq!(remaining_secs, 2);
                assert_eq!(total_secs, 3);
                assert_eq!(current_task_id.as_deref(), Some("t"));
            }
            other => panic!("Expected StateSnapshot, got {other:?}"),
        }
    }

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_mm_ss(0), "00:00");
        assert_eq!(format_mm_ss(65), "01:05");
        assert_eq!(format_mm_ss(3600), "60:00");
    }
}
