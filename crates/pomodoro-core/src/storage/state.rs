//! Load and save the persisted application state.
//!
//! Everything is read once at startup. Afterwards the controller rewrites
//! the individual blobs that a mutation touched.

use super::{keys, load_json, save_json, KvStore};
use crate::error::Result;
use crate::history::{SessionLog, SessionRecord};
use crate::task::{Task, TaskGroup, TaskStore, INBOX_GROUP_ID};
use crate::timer::TimerConfig;

/// Snapshot of every persisted blob.
#[derive(Debug, Clone, Default)]
pub struct PersistedState {
    pub config: TimerConfig,
    pub groups: Vec<TaskGroup>,
    pub current_task_id: Option<String>,
    pub completed_focus_count: u32,
    pub history: Vec<SessionRecord>,
}

impl PersistedState {
    /// Read all blobs. Missing or malformed values fall back to defaults.
    ///
    /// # Errors
    /// Only storage failures are returned; bad data never is.
    pub fn load(store: &dyn KvStore) -> Result<Self> {
        let config = match store.get(keys::SETTINGS)? {
            Some(raw) => TimerConfig::from_json_or_default(&raw),
            None => TimerConfig::default(),
        };

        let groups = match load_json::<Vec<TaskGroup>>(store, keys::TASK_GROUPS)? {
            Some(groups) => groups,
            None => load_json::<Vec<Task>>(store, keys::LEGACY_TASKS)?
                .filter(|tasks| !tasks.is_empty())
                .map(|tasks| {
                    tracing::info!(count = tasks.len(), "importing flat task list into inbox");
                    vec![TaskGroup {
                        id: INBOX_GROUP_ID.to_string(),
                        name: "Inbox".to_string(),
                        tasks,
                        created_at: chrono::Utc::now(),
                    }]
                })
                .unwrap_or_default(),
        };

        let state = Self {
            config,
            groups,
            current_task_id: load_json::<Option<String>>(store, keys::CURRENT_TASK)?.flatten(),
            completed_focus_count: load_json(store, keys::COMPLETED_FOCUS)?.unwrap_or(0),
            history: load_json(store, keys::SESSION_HISTORY)?.unwrap_or_default(),
        };
        tracing::info!(
            groups = state.groups.len(),
            sessions = state.history.len(),
            completed_focus = state.completed_focus_count,
            "loaded persisted state"
        );
        Ok(state)
    }

    pub fn into_parts(self) -> (TimerConfig, TaskStore, u32, SessionLog) {
        (
            self.config,
            TaskStore::from_parts(self.groups, self.current_task_id),
            self.completed_focus_count,
            SessionLog::from(self.history),
        )
    }
}

pub fn save_config(store: &dyn KvStore, config: &TimerConfig) -> Result<()> {
    save_json(store, keys::SETTINGS, config)
}

pub fn save_tasks(store: &dyn KvStore, tasks: &TaskStore) -> Result<()> {
    save_json(store, keys::TASK_GROUPS, tasks.groups())?;
    save_json(store, keys::CURRENT_TASK, &tasks.current_id())
}

pub fn save_completed_focus(store: &dyn KvStore, count: u32) -> Result<()> {
    save_json(store, keys::COMPLETED_FOCUS, &count)
}

pub fn save_history(store: &dyn KvStore, history: &SessionLog) -> Result<()> {
    save_json(store, keys::SESSION_HISTORY, history)
}
