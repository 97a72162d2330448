//! The single owner of timer, tasks and history.
//!
//! A `Controller` is built once at startup from the persisted state and
//! dropped at exit. Views call into it; it forwards to the engine and the
//! task store, fires cues and notifications, and rewrites the affected
//! blobs after every mutation.

use chrono::{DateTime, TimeZone, Utc};

use crate::error::{Result, ValidationError};
use crate::events::Event;
use crate::history::SessionLog;
use crate::notify::{completion_message, Cue, CuePlayer, NotificationGate, Silent};
use crate::stats::{aggregate, StatsSummary, Timeframe};
use crate::storage::state::{self, PersistedState};
use crate::storage::KvStore;
use crate::task::{Subtask, Task, TaskGroup, TaskStore};
use crate::timer::{Phase, PhaseCompletion, TimerConfig, TimerEngine};

pub struct Controller {
    engine: TimerEngine,
    tasks: TaskStore,
    history: SessionLog,
    store: Box<dyn KvStore>,
    notifications: NotificationGate,
    cues: Box<dyn CuePlayer>,
}

impl Controller {
    /// Load persisted state from `store`. Collaborators start silent.
    ///
    /// # Errors
    /// Returns an error only if the store itself cannot be read.
    pub fn load(store: Box<dyn KvStore>) -> Result<Self> {
        let (config, tasks, completed, history) = PersistedState::load(store.as_ref())?.into_parts();
        Ok(Self {
            engine: TimerEngine::new(config).with_completed_focus_count(completed),
            tasks,
            history,
            store,
            notifications: NotificationGate::new(Box::new(Silent)),
            cues: Box::new(Silent),
        })
    }

    pub fn with_notifications(mut self, gate: NotificationGate) -> Self {
        self.notifications = gate;
        self
    }

    pub fn with_cue_player(mut self, player: Box<dyn CuePlayer>) -> Self {
        self.cues = player;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn tasks(&self) -> &TaskStore {
        &self.tasks
    }

    pub fn history(&self) -> &SessionLog {
        &self.history
    }

    pub fn store(&self) -> &dyn KvStore {
        self.store.as_ref()
    }

    pub fn notifications(&self) -> &NotificationGate {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut NotificationGate {
        &mut self.notifications
    }

    pub fn snapshot(&self) -> Event {
        self.engine.snapshot(self.tasks.current_id())
    }

    pub fn stats<Tz: TimeZone>(&self, timeframe: Timeframe, now: &DateTime<Tz>) -> StatsSummary {
        aggregate(self.history.records(), timeframe, now)
    }

    // ── Timer ────────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        self.start_at(Utc::now())
    }

    /// Start the countdown and play the start cue.
    pub fn start_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        let event = self.engine.start_at(now)?;
        self.play(Cue::Start);
        Some(event)
    }

    pub fn pause(&mut self) -> Option<Event> {
        self.engine.pause()
    }

    pub fn toggle(&mut self) -> Option<Event> {
        if self.engine.is_running() {
            self.pause()
        } else {
            self.start()
        }
    }

    pub fn reset(&mut self) -> Event {
        self.engine.reset()
    }

    pub fn change_mode(&mut self, phase: Phase) -> Event {
        self.engine.change_mode(phase)
    }

    /// Replace the timer configuration and persist it.
    pub fn update_config(&mut self, config: TimerConfig) -> Result<Event> {
        let event = self.engine.update_config(config);
        state::save_config(self.store.as_ref(), self.engine.config())?;
        Ok(event)
    }

    pub fn tick(&mut self) -> Vec<Event> {
        self.tick_at(Utc::now())
    }

    /// One elapsed second. Returns the completion and phase-change events
    /// when the phase ran out, otherwise nothing.
    pub fn tick_at(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        match self.engine.tick_at(now, self.tasks.current_id()) {
            Some(done) => self.on_phase_completed(done),
            None => Vec::new(),
        }
    }

    // ── Tasks ────────────────────────────────────────────────────────

    pub fn add_task(&mut self, name: &str, duration_minutes: i64) -> Result<Task> {
        let task = self.tasks.add_task(name, duration_minutes)?;
        self.save_tasks()?;
        Ok(task)
    }

    pub fn add_task_to_group(&mut self, group_id: &str, name: &str, duration_minutes: i64) -> Result<Task> {
        let task = self.tasks.add_task_to_group(group_id, name, duration_minutes)?;
        self.save_tasks()?;
        Ok(task)
    }

    pub fn edit_task(&mut self, id: &str, name: &str, duration_minutes: i64) -> Result<()> {
        self.tasks.edit_task(id, name, duration_minutes)?;
        self.save_tasks()
    }

    pub fn delete_task(&mut self, id: &str) -> Result<Task> {
        let task = self.tasks.delete_task(id)?;
        self.save_tasks()?;
        Ok(task)
    }

    pub fn toggle_completion(&mut self, id: &str) -> Result<bool> {
        let completed = self.tasks.toggle_completion(id)?;
        self.save_tasks()?;
        Ok(completed)
    }

    pub fn set_current(&mut self, id: Option<&str>) -> Result<()> {
        self.tasks.set_current(id)?;
        self.save_tasks()
    }

    pub fn increment_pomodoro(&mut self, id: &str) -> Result<u32> {
        let total = self.tasks.increment_pomodoro(id)?;
        self.save_tasks()?;
        Ok(total)
    }

    pub fn add_subtask(&mut self, task_id: &str, name: &str) -> Result<Subtask> {
        let subtask = self.tasks.add_subtask(task_id, name)?;
        self.save_tasks()?;
        Ok(subtask)
    }

    pub fn toggle_subtask(&mut self, task_id: &str, subtask_id: &str) -> Result<bool> {
        let completed = self.tasks.toggle_subtask(task_id, subtask_id)?;
        self.save_tasks()?;
        Ok(completed)
    }

    pub fn delete_subtask(&mut self, task_id: &str, subtask_id: &str) -> Result<Subtask> {
        let subtask = self.tasks.delete_subtask(task_id, subtask_id)?;
        self.save_tasks()?;
        Ok(subtask)
    }

    pub fn add_group(&mut self, name: &str) -> Result<TaskGroup> {
        let group = self.tasks.add_group(name)?;
        self.save_tasks()?;
        Ok(group)
    }

    pub fn rename_group(&mut self, id: &str, name: &str) -> Result<()> {
        self.tasks.rename_group(id, name)?;
        self.save_tasks()
    }

    pub fn delete_group(&mut self, id: &str) -> Result<TaskGroup> {
        let group = self.tasks.delete_group(id)?;
        self.save_tasks()?;
        Ok(group)
    }

    /// Resolve an exact task id or unique prefix.
    pub fn resolve_task_id(&self, needle: &str) -> Result<String, ValidationError> {
        self.tasks.resolve_task_id(needle)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn on_phase_completed(&mut self, done: PhaseCompletion) -> Vec<Event> {
        self.play(Cue::End);
        let (title, body) = completion_message(done.completed, done.completed_focus_count);
        self.notifications.send(&title, &body);

        self.history.append(done.record.clone());
        if let Err(e) = state::save_history(self.store.as_ref(), &self.history) {
            tracing::error!(error = %e, "failed to persist session history");
        }

        if done.completed == Phase::Focus {
            if let Some(id) = self.tasks.current_id().map(str::to_string) {
                match self.tasks.increment_pomodoro(&id) {
                    Ok(total) => tracing::debug!(task_id = %id, total, "credited pomodoro"),
                    Err(e) => tracing::warn!(task_id = %id, error = %e, "could not credit pomodoro"),
                }
                if let Err(e) = self.save_tasks() {
                    tracing::error!(error = %e, "failed to persist tasks");
                }
            }
            if let Err(e) = state::save_completed_focus(self.store.as_ref(), done.completed_focus_count) {
                tracing::error!(error = %e, "failed to persist focus count");
            }
        }

        done.events(self.engine.total_secs())
    }

    fn play(&self, cue: Cue) {
        if let Err(e) = self.cues.play(cue) {
            tracing::warn!(?cue, error = %e, "cue playback failed");
        }
    }

    fn save_tasks(&self) -> Result<()> {
        state::save_tasks(self.store.as_ref(), &self.tasks)
    }
}
