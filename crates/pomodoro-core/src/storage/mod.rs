mod config;
pub mod database;
mod memory;
pub mod state;

pub use config::{AudioConfig, Config, LoggingConfig, NotificationsConfig};
pub use database::Database;
pub use memory::MemoryStore;
pub use state::PersistedState;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;

use crate::error::Result;

/// Keys of the persisted JSON blobs.
pub mod keys {
    pub const SETTINGS: &str = "settings";
    pub const TASK_GROUPS: &str = "taskGroups";
    /// Flat task list written by the ungrouped browser build; read-only.
    pub const LEGACY_TASKS: &str = "tasks";
    pub const CURRENT_TASK: &str = "currentTaskId";
    pub const COMPLETED_FOCUS: &str = "completedFocusCount";
    pub const SESSION_HISTORY: &str = "sessionHistory";
}

/// String key-value storage for JSON blobs.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Read and decode a blob. Malformed JSON is logged and treated as absent.
pub fn load_json<T: DeserializeOwned>(store: &dyn KvStore, key: &str) -> Result<Option<T>> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            tracing::warn!(key, error = %e, "ignoring malformed persisted value");
            Ok(None)
        }
    }
}

pub fn save_json<T: Serialize + ?Sized>(store: &dyn KvStore, key: &str, value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;
    store.set(key, &json)
}

/// Returns the data directory, creating it if needed.
///
/// `POMODORO_DATA_DIR` wins when set; otherwise `~/.config/pomodoro[-dev]/`
/// based on `POMODORO_ENV` (set it to `dev` for a development directory).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("POMODORO_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("POMODORO_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("pomodoro-dev")
            } else {
                base_dir.join("pomodoro")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
