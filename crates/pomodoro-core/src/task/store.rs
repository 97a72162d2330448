use chrono::Utc;

use super::{check_duration, clean_name, new_id, Subtask, Task, TaskGroup};
use crate::error::ValidationError;

/// Id of the group that receives tasks added without an explicit group.
pub const INBOX_GROUP_ID: &str = "inbox";

/// Grouped task collection plus the "current task" pointer.
///
/// Every mutation validates first and leaves the store untouched on error.
#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    groups: Vec<TaskGroup>,
    current: Option<String>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted parts. A current id that no longer exists is dropped.
    pub fn from_parts(groups: Vec<TaskGroup>, current: Option<String>) -> Self {
        let mut store = Self {
            groups,
            current: None,
        };
        if let Some(id) = current {
            if store.task(&id).is_some() {
                store.current = Some(id);
            } else {
                tracing::warn!(task_id = %id, "persisted current task no longer exists, clearing");
            }
        }
        store
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn groups(&self) -> &[TaskGroup] {
        &self.groups
    }

    pub fn group(&self, id: &str) -> Option<&TaskGroup> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.groups.iter().flat_map(|g| g.tasks.iter())
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks().find(|t| t.id == id)
    }

    pub fn current_id(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn current(&self) -> Option<&Task> {
        self.current.as_deref().and_then(|id| self.task(id))
    }

    /// Resolve an exact task id or a unique id prefix.
    pub fn resolve_task_id(&self, needle: &str) -> Result<String, ValidationError> {
        if needle.trim().is_empty() {
            return Err(ValidationError::EmptyName { field: "task id" });
        }
        if self.task(needle).is_some() {
            return Ok(needle.to_string());
        }
        let mut matches = self.tasks().filter(|t| t.id.starts_with(needle));
        match (matches.next(), matches.next()) {
            (Some(task), None) => Ok(task.id.clone()),
            (Some(_), Some(_)) => Err(ValidationError::InvalidValue {
                field: "task id".into(),
                message: format!("'{needle}' matches more than one task"),
            }),
            (None, _) => Err(ValidationError::not_found("task", needle)),
        }
    }

    // ── Groups ───────────────────────────────────────────────────────

    pub fn add_group(&mut self, name: &str) -> Result<TaskGroup, ValidationError> {
        let group = TaskGroup::new(name)?;
        self.groups.push(group.clone());
        Ok(group)
    }

    pub fn rename_group(&mut self, id: &str, name: &str) -> Result<(), ValidationError> {
        let name = clean_name(name, "group name")?;
        let group = self
            .groups
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| ValidationError::not_found("group", id))?;
        group.name = name;
        Ok(())
    }

    /// Remove a group and its tasks. Clears the current pointer if it was inside.
    pub fn delete_group(&mut self, id: &str) -> Result<TaskGroup, ValidationError> {
        let idx = self
            .groups
            .iter()
            .position(|g| g.id == id)
            .ok_or_else(|| ValidationError::not_found("group", id))?;
        let group = self.groups.remove(idx);
        if let Some(current) = self.current.as_deref() {
            if group.contains(current) {
                self.current = None;
            }
        }
        Ok(group)
    }

    // ── Tasks ────────────────────────────────────────────────────────

    /// Add a task to the inbox group, creating the inbox on first use.
    pub fn add_task(&mut self, name: &str, duration_minutes: i64) -> Result<Task, ValidationError> {
        let task = Task::new(name, duration_minutes)?;
        let inbox = match self.groups.iter().position(|g| g.id == INBOX_GROUP_ID) {
            Some(idx) => idx,
            None => {
                self.groups.push(TaskGroup {
                    id: INBOX_GROUP_ID.to_string(),
                    name: "Inbox".to_string(),
                    tasks: Vec::new(),
                    created_at: Utc::now(),
                });
                self.groups.len() - 1
            }
        };
        self.groups[inbox].tasks.push(task.clone());
        Ok(task)
    }

    pub fn add_task_to_group(
        &mut self,
        group_id: &str,
        name: &str,
        duration_minutes: i64,
    ) -> Result<Task, ValidationError> {
        let task = Task::new(name, duration_minutes)?;
        let group = self
            .groups
            .iter_mut()
            .find(|g| g.id == group_id)
            .ok_or_else(|| ValidationError::not_found("group", group_id))?;
        group.tasks.push(task.clone());
        Ok(task)
    }

    pub fn edit_task(
        &mut self,
        id: &str,
        name: &str,
        duration_minutes: i64,
    ) -> Result<(), ValidationError> {
        let name = clean_name(name, "task name")?;
        let minutes = check_duration(duration_minutes)?;
        let task = self.task_mut(id)?;
        task.name = name;
        task.duration_minutes = minutes;
        Ok(())
    }

    /// Remove a task. Clears the current pointer only if it pointed here.
    pub fn delete_task(&mut self, id: &str) -> Result<Task, ValidationError> {
        for group in &mut self.groups {
            if let Some(idx) = group.tasks.iter().position(|t| t.id == id) {
                let task = group.tasks.remove(idx);
                if self.current.as_deref() == Some(id) {
                    self.current = None;
                }
                return Ok(task);
            }
        }
        Err(ValidationError::not_found("task", id))
    }

    /// Flip the completed flag, returning the new value.
    pub fn toggle_completion(&mut self, id: &str) -> Result<bool, ValidationError> {
        let task = self.task_mut(id)?;
        task.completed = !task.completed;
        Ok(task.completed)
    }

    /// Select the task credited with focus pomodoros, or clear the selection.
    pub fn set_current(&mut self, id: Option<&str>) -> Result<(), ValidationError> {
        match id {
            Some(id) => {
                if self.task(id).is_none() {
                    return Err(ValidationError::not_found("task", id));
                }
                self.current = Some(id.to_string());
            }
            None => self.current = None,
        }
        Ok(())
    }

    /// Credit one pomodoro, returning the task's new total.
    pub fn increment_pomodoro(&mut self, id: &str) -> Result<u32, ValidationError> {
        let task = self.task_mut(id)?;
        task.pomodoros_completed = task.pomodoros_completed.saturating_add(1);
        Ok(task.pomodoros_completed)
    }

    // ── Subtasks ─────────────────────────────────────────────────────

    pub fn add_subtask(&mut self, task_id: &str, name: &str) -> Result<Subtask, ValidationError> {
        let name = clean_name(name, "subtask name")?;
        let task = self.task_mut(task_id)?;
        let subtask = Subtask {
            id: new_id("sub"),
            name,
            completed: false,
        };
        task.subtasks.push(subtask.clone());
        Ok(subtask)
    }

    pub fn toggle_subtask(&mut self, task_id: &str, subtask_id: &str) -> Result<bool, ValidationError> {
        let task = self.task_mut(task_id)?;
        let subtask = task
            .subtasks
            .iter_mut()
            .find(|s| s.id == subtask_id)
            .ok_or_else(|| ValidationError::not_found("subtask", subtask_id))?;
        subtask.completed = !subtask.completed;
        Ok(subtask.completed)
    }

    pub fn delete_subtask(&mut self, task_id: &str, subtask_id: &str) -> Result<Subtask, ValidationError> {
        let task = self.task_mut(task_id)?;
        let idx = task
            .subtasks
            .iter()
            .position(|s| s.id == subtask_id)
            .ok_or_else(|| ValidationError::not_found("subtask", subtask_id))?;
        Ok(task.subtasks.remove(idx))
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn task_mut(&mut self, id: &str) -> Result<&mut Task, ValidationError> {
        self.groups
            .iter_mut()
            .flat_map(|g| g.tasks.iter_mut())
            .find(|t| t.id == id)
            .ok_or_else(|| ValidationError::not_found("task", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_task_rejects_empty_name() {
        let mut store = TaskStore::new();
        assert!(store.add_task("", 25).is_err());
        assert!(store.add_task("   ", 25).is_err());
        assert_eq!(store.tasks().count(), 0);
        assert!(store.groups().is_empty());
    }

    #[test]
    fn add_task_creates_inbox_once() {
        let mut store = TaskStore::new();
        let task = store.add_task("Write report", 25).unwrap();
        store.add_task("Review PR", 50).unwrap();
        assert_eq!(task.pomodoros_completed, 0);
        assert!(!task.completed);
        assert_eq!(store.groups().len(), 1);
        assert_eq!(store.groups()[0].id, INBOX_GROUP_ID);
        assert_eq!(store.tasks().count(), 2);
    }

    #[test]
    fn deleting_current_task_clears_pointer() {
        let mut store = TaskStore::new();
        let a = store.add_task("A", 25).unwrap();
        let b = store.add_task("B", 25).unwrap();
        store.set_current(Some(&a.id)).unwrap();

        store.delete_task(&b.id).unwrap();
        assert_eq!(store.current_id(), Some(a.id.as_str()));

        store.delete_task(&a.id).unwrap();
        assert_eq!(store.current_id(), None);
    }

    #[test]
    fn deleting_group_with_current_task_clears_pointer() {
        let mut store = TaskStore::new();
        let work = store.add_group("Work").unwrap();
        let home = store.add_group("Home").unwrap();
        let t = store.add_task_to_group(&work.id, "Deploy", 30).unwrap();
        store.set_current(Some(&t.id)).unwrap();

        store.delete_group(&home.id).unwrap();
        assert_eq!(store.current_id(), Some(t.id.as_str()));

        let removed = store.delete_group(&work.id).unwrap();
        assert_eq!(removed.tasks.len(), 1);
        assert!(store.current().is_none());
    }

    #[test]
    fn set_current_rejects_unknown_task() {
        let mut store = TaskStore::new();
        assert!(store.set_current(Some("nope")).is_err());
        assert!(store.set_current(None).is_ok());
    }

    #[test]
    fn edit_validates_before_mutating() {
        let mut store = TaskStore::new();
        let t = store.add_task("Draft", 25).unwrap();
        assert!(store.edit_task(&t.id, " ", 30).is_err());
        assert!(store.edit_task(&t.id, "Final", 0).is_err());
        assert_eq!(store.task(&t.id).unwrap().name, "Draft");

        store.edit_task(&t.id, " Final ", 45).unwrap();
        let edited = store.task(&t.id).unwrap();
        assert_eq!(edited.name, "Final");
        assert_eq!(edited.duration_minutes, 45);
    }

    #[test]
    fn toggle_and_increment() {
        let mut store = TaskStore::new();
        let t = store.add_task("Read", 25).unwrap();
        assert!(store.toggle_completion(&t.id).unwrap());
        assert!(!store.toggle_completion(&t.id).unwrap());
        assert_eq!(store.increment_pomodoro(&t.id).unwrap(), 1);
        assert_eq!(store.increment_pomodoro(&t.id).unwrap(), 2);
        assert!(store.increment_pomodoro("missing").is_err());
    }

    #[test]
    fn subtask_lifecycle() {
        let mut store = TaskStore::new();
        let t = store.add_task("Launch", 25).unwrap();
        assert!(store.add_subtask(&t.id, "").is_err());
        let s1 = store.add_subtask(&t.id, "Write notes").unwrap();
        let s2 = store.add_subtask(&t.id, "Tag release").unwrap();

        assert!(store.toggle_subtask(&t.id, &s1.id).unwrap());
        assert_eq!(store.task(&t.id).unwrap().subtasks_done(), 1);

        store.delete_subtask(&t.id, &s1.id).unwrap();
        let task = store.task(&t.id).unwrap();
        assert_eq!(task.subtasks.len(), 1);
        assert_eq!(task.subtasks[0].id, s2.id);
        assert!(store.toggle_subtask(&t.id, &s1.id).is_err());
    }

    #[test]
    fn rename_group_trims() {
        let mut store = TaskStore::new();
        let g = store.add_group("Work").unwrap();
        assert!(store.rename_group(&g.id, "  ").is_err());
        store.rename_group(&g.id, " Deep work ").unwrap();
        assert_eq!(store.group(&g.id).unwrap().name, "Deep work");
    }

    #[test]
    fn resolves_unique_prefix() {
        let mut store = TaskStore::new();
        let t = store.add_task("One", 25).unwrap();
        let prefix = &t.id[..12];
        assert_eq!(store.resolve_task_id(prefix).unwrap(), t.id);
        assert_eq!(store.resolve_task_id(&t.id).unwrap(), t.id);
        assert!(store.resolve_task_id("zzz").is_err());
    }

    #[test]
    fn blank_id_matches_nothing() {
        let mut store = TaskStore::new();
        store.add_task("Only", 25).unwrap();
        for needle in ["", "  "] {
            assert_eq!(
                store.resolve_task_id(needle),
                Err(ValidationError::EmptyName { field: "task id" })
            );
        }
        assert_eq!(store.tasks().count(), 1);
    }

    #[test]
    fn from_parts_drops_dangling_current() {
        let mut store = TaskStore::new();
        let t = store.add_task("Keep", 25).unwrap();
        let groups = store.groups().to_vec();

        let restored = TaskStore::from_parts(groups.clone(), Some(t.id.clone()));
        assert_eq!(restored.current_id(), Some(t.id.as_str()));

        let restored = TaskStore::from_parts(groups, Some("gone".into()));
        assert!(restored.current_id().is_none());
    }
}
