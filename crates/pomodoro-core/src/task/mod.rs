//! Tasks, subtasks and task groups.
//!
//! Tasks are credited with completed focus pomodoros while they are the
//! store's "current" task. Every task lives in a group; tasks added without
//! a group land in the implicit inbox group.

mod store;

pub use store::{TaskStore, INBOX_GROUP_ID};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subtask {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub completed: bool,
}

/// A unit of work that focus sessions are credited to.
///
/// Wire names follow the browser build (`duration` is in minutes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    #[serde(rename = "duration")]
    pub duration_minutes: u32,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub pomodoros_completed: u32,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Build a task from unvalidated input.
    pub fn new(name: &str, duration_minutes: i64) -> Result<Self, ValidationError> {
        Ok(Self {
            id: new_id("task"),
            name: clean_name(name, "task name")?,
            duration_minutes: check_duration(duration_minutes)?,
            completed: false,
            pomodoros_completed: 0,
            subtasks: Vec::new(),
            created_at: Utc::now(),
        })
    }

    /// Number of finished subtasks.
    pub fn subtasks_done(&self) -> usize {
        self.subtasks.iter().filter(|s| s.completed).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskGroup {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
    pub created_at: DateTime<Utc>,
}

impl TaskGroup {
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            id: new_id("group"),
            name: clean_name(name, "group name")?,
            tasks: Vec::new(),
            created_at: Utc::now(),
        })
    }

    pub fn contains(&self, task_id: &str) -> bool {
        self.tasks.iter().any(|t| t.id == task_id)
    }
}

pub(crate) fn new_id(prefix: &str) -> String {
    format!("{prefix}-{}", uuid::Uuid::new_v4().simple())
}

/// Trim `name`, rejecting it when nothing is left.
pub(crate) fn clean_name(name: &str, field: &'static str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName { field });
    }
    Ok(trimmed.to_string())
}

pub(crate) fn check_duration(minutes: i64) -> Result<u32, ValidationError> {
    if minutes <= 0 {
        return Err(ValidationError::NonPositiveDuration(minutes));
    }
    u32::try_from(minutes).map_err(|_| ValidationError::InvalidValue {
        field: "duration".into(),
        message: format!("{minutes} minutes is too large"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_task_trims_and_starts_fresh() {
        let task = Task::new("  Write report ", 25).unwrap();
        assert_eq!(task.name, "Write report");
        assert_eq!(task.duration_minutes, 25);
        assert_eq!(task.pomodoros_completed, 0);
        assert!(!task.completed);
        assert!(task.subtasks.is_empty());
        assert!(task.id.starts_with("task-"));
    }

    #[test]
    fn new_task_rejects_bad_input() {
        assert_eq!(
            Task::new("   ", 25).unwrap_err(),
            ValidationError::EmptyName { field: "task name" }
        );
        assert_eq!(
            Task::new("Read", 0).unwrap_err(),
            ValidationError::NonPositiveDuration(0)
        );
        assert!(Task::new("Read", -3).is_err());
        assert!(Task::new("Read", i64::from(u32::MAX) + 1).is_err());
    }

    #[test]
    fn task_reads_browser_blob() {
        let json = r#"{"id":"1700000000000","name":"Inbox zero","duration":30,
            "completed":false,"pomodorosCompleted":2,
            "subtasks":[{"id":"s1","name":"Archive","completed":true}],
            "createdAt":"2024-01-01T10:00:00.000Z"}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.duration_minutes, 30);
        assert_eq!(task.pomodoros_completed, 2);
        assert_eq!(task.subtasks_done(), 1);
    }
}
