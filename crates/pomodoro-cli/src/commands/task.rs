//! Task management commands for CLI.
//!
//! Task ids may be abbreviated to any unique prefix.

use clap::Subcommand;
use pomodoro_core::{Controller, Task, ValidationError};

use super::group::resolve_group_id;
use super::{open_controller, CmdResult};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new task
    Add {
        /// Task name
        name: String,
        /// Planned duration in minutes
        #[arg(long, short, default_value_t = 25, allow_negative_numbers = true)]
        minutes: i64,
        /// Group to add the task to (default: inbox)
        #[arg(long, short)]
        group: Option<String>,
        /// Make the new task the current one
        #[arg(long)]
        select: bool,
    },
    /// List tasks by group
    List {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show task details
    Show {
        /// Task ID
        id: String,
    },
    /// Rename a task or change its duration
    Edit {
        /// Task ID
        id: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New duration in minutes
        #[arg(long, allow_negative_numbers = true)]
        minutes: Option<i64>,
    },
    /// Toggle a task's completed flag
    Done {
        /// Task ID
        id: String,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: String,
    },
    /// Credit completed focus sessions to this task
    Select {
        /// Task ID
        id: String,
    },
    /// Stop crediting any task
    Clear,
    /// Subtask management
    Subtask {
        #[command(subcommand)]
        action: SubtaskAction,
    },
}

#[derive(Subcommand)]
pub enum SubtaskAction {
    /// Add a subtask
    Add {
        /// Parent task ID
        task: String,
        /// Subtask name
        name: String,
    },
    /// Toggle a subtask's completed flag
    Toggle {
        /// Parent task ID
        task: String,
        /// Subtask ID
        id: String,
    },
    /// Delete a subtask
    Delete {
        /// Parent task ID
        task: String,
        /// Subtask ID
        id: String,
    },
}

pub fn run(action: TaskAction) -> CmdResult {
    let mut controller = open_controller()?;

    match action {
        TaskAction::Add {
            name,
            minutes,
            group,
            select,
        } => {
            let task = match group {
                Some(group) => {
                    let group_id = resolve_group_id(&controller, &group)?;
                    controller.add_task_to_group(&group_id, &name, minutes)?
                }
                None => controller.add_task(&name, minutes)?,
            };
            if select {
                controller.set_current(Some(&task.id))?;
            }
            println!("Task created: {}", task.id);
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::List { json } => {
            if json {
                let tasks: Vec<&Task> = controller.tasks().tasks().collect();
                println!("{}", serde_json::to_string_pretty(&tasks)?);
            } else {
                print_tree(&controller);
            }
        }
        TaskAction::Show { id } => {
            let id = controller.resolve_task_id(&id)?;
            let task = controller
                .tasks()
                .task(&id)
                .ok_or_else(|| ValidationError::NotFound { kind: "task", id: id.clone() })?;
            println!("{}", serde_json::to_string_pretty(task)?);
        }
        TaskAction::Edit { id, name, minutes } => {
            let id = controller.resolve_task_id(&id)?;
            let (old_name, old_minutes) = controller
                .tasks()
                .task(&id)
                .map(|t| (t.name.clone(), i64::from(t.duration_minutes)))
                .ok_or_else(|| ValidationError::NotFound { kind: "task", id: id.clone() })?;
            controller.edit_task(
                &id,
                name.as_deref().unwrap_or(&old_name),
                minutes.unwrap_or(old_minutes),
            )?;
            println!("Task updated: {id}");
        }
        TaskAction::Done { id } => {
            let id = controller.resolve_task_id(&id)?;
            let completed = controller.toggle_completion(&id)?;
            let state = if completed { "completed" } else { "reopened" };
            println!("Task {state}: {id}");
        }
        TaskAction::Delete { id } => {
            let id = controller.resolve_task_id(&id)?;
            let task = controller.delete_task(&id)?;
            println!("Task deleted: {} ({})", task.id, task.name);
        }
        TaskAction::Select { id } => {
            let id = controller.resolve_task_id(&id)?;
            controller.set_current(Some(&id))?;
            println!("Current task: {id}");
        }
        TaskAction::Clear => {
            controller.set_current(None)?;
            println!("Current task cleared");
        }
        TaskAction::Subtask { action } => run_subtask(&mut controller, action)?,
    }
    Ok(())
}

fn run_subtask(controller: &mut Controller, action: SubtaskAction) -> CmdResult {
    match action {
        SubtaskAction::Add { task, name } => {
            let task_id = controller.resolve_task_id(&task)?;
            let subtask = controller.add_subtask(&task_id, &name)?;
            println!("Subtask created: {}", subtask.id);
        }
        SubtaskAction::Toggle { task, id } => {
            let task_id = controller.resolve_task_id(&task)?;
            let id = resolve_subtask_id(controller, &task_id, &id)?;
            let completed = controller.toggle_subtask(&task_id, &id)?;
            let state = if completed { "completed" } else { "reopened" };
            println!("Subtask {state}: {id}");
        }
        SubtaskAction::Delete { task, id } => {
            let task_id = controller.resolve_task_id(&task)?;
            let id = resolve_subtask_id(controller, &task_id, &id)?;
            let subtask = controller.delete_subtask(&task_id, &id)?;
            println!("Subtask deleted: {} ({})", subtask.id, subtask.name);
        }
    }
    Ok(())
}

fn resolve_subtask_id(controller: &Controller, task_id: &str, needle: &str) -> Result<String, ValidationError> {
    if needle.trim().is_empty() {
        return Err(ValidationError::EmptyName { field: "subtask id" });
    }
    let task = controller
        .tasks()
        .task(task_id)
        .ok_or_else(|| ValidationError::NotFound { kind: "task", id: task_id.to_string() })?;
    if task.subtasks.iter().any(|s| s.id == needle) {
        return Ok(needle.to_string());
    }
    let mut matches = task.subtasks.iter().filter(|s| s.id.starts_with(needle));
    match (matches.next(), matches.next()) {
        (Some(subtask), None) => Ok(subtask.id.clone()),
        (Some(_), Some(_)) => Err(ValidationError::InvalidValue {
            field: "subtask id".into(),
            message: format!("'{needle}' matches more than one subtask"),
        }),
        (None, _) => Err(ValidationError::NotFound {
            kind: "subtask",
            id: needle.to_string(),
        }),
    }
}

fn print_tree(controller: &Controller) {
    let current = controller.tasks().current_id();
    for group in controller.tasks().groups() {
        println!("{} ({})", group.name, group.id);
        if group.tasks.is_empty() {
            println!("  (no tasks)");
        }
        for task in &group.tasks {
            let marker = if Some(task.id.as_str()) == current { '>' } else { ' ' };
            let check = if task.completed { 'x' } else { ' ' };
            let mut line = format!(
                " {marker}[{check}] {}  {}m  {} pomodoros",
                task.name, task.duration_minutes, task.pomodoros_completed
            );
            if !task.subtasks.is_empty() {
                line.push_str(&format!("  {}/{} subtasks", task.subtasks_done(), task.subtasks.len()));
            }
            println!("{line}  {}", task.id);
            for subtask in &task.subtasks {
                let check = if subtask.completed { 'x' } else { ' ' };
                println!("       [{check}] {}  {}", subtask.name, subtask.id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pomodoro_core::MemoryStore;

    #[test]
    fn subtask_ids_resolve_by_prefix_but_not_blank() {
        let mut controller = Controller::load(Box::new(MemoryStore::new())).unwrap();
        let task = controller.add_task("Slides", 25).unwrap();
        let subtask = controller.add_subtask(&task.id, "Outline").unwrap();

        assert_eq!(
            resolve_subtask_id(&controller, &task.id, &subtask.id[..8]).unwrap(),
            subtask.id
        );
        assert_eq!(
            resolve_subtask_id(&controller, &task.id, ""),
            Err(ValidationError::EmptyName { field: "subtask id" })
        );
        assert!(controller.delete_subtask(&task.id, "").is_err());
        assert_eq!(controller.tasks().task(&task.id).unwrap().subtasks.len(), 1);
    }
}
