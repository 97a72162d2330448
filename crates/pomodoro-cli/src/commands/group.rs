//! Task group commands for CLI.

use clap::Subcommand;
use pomodoro_core::{Controller, ValidationError};

use super::{open_controller, CmdResult};

#[derive(Subcommand)]
pub enum GroupAction {
    /// Create a group
    Add {
        /// Group name
        name: String,
    },
    /// Rename a group
    Rename {
        /// Group ID or name
        id: String,
        /// New name
        name: String,
    },
    /// Delete a group and all of its tasks
    Delete {
        /// Group ID or name
        id: String,
    },
    /// List groups
    List,
}

pub fn run(action: GroupAction) -> CmdResult {
    let mut controller = open_controller()?;

    match action {
        GroupAction::Add { name } => {
            let group = controller.add_group(&name)?;
            println!("Group created: {}", group.id);
        }
        GroupAction::Rename { id, name } => {
            let id = resolve_group_id(&controller, &id)?;
            controller.rename_group(&id, &name)?;
            println!("Group renamed: {id}");
        }
        GroupAction::Delete { id } => {
            let id = resolve_group_id(&controller, &id)?;
            let group = controller.delete_group(&id)?;
            println!("Group deleted: {} ({} tasks removed)", group.name, group.tasks.len());
        }
        GroupAction::List => {
            let summary: Vec<serde_json::Value> = controller
                .tasks()
                .groups()
                .iter()
                .map(|g| {
                    serde_json::json!({
                        "id": g.id,
                        "name": g.name,
                        "tasks": g.tasks.len(),
                        "createdAt": g.created_at,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }
    Ok(())
}

/// Match a group by exact id, unique id prefix, or exact name (case-insensitive).
pub fn resolve_group_id(controller: &Controller, needle: &str) -> Result<String, ValidationError> {
    if needle.trim().is_empty() {
        return Err(ValidationError::EmptyName { field: "group id" });
    }
    let groups = controller.tasks().groups();
    if let Some(group) = groups.iter().find(|g| g.id == needle) {
        return Ok(group.id.clone());
    }
    let mut matches = groups
        .iter()
        .filter(|g| g.id.starts_with(needle) || g.name.eq_ignore_ascii_case(needle.trim()));
    match (matches.next(), matches.next()) {
        (Some(group), None) => Ok(group.id.clone()),
        (Some(_), Some(_)) => Err(ValidationError::InvalidValue {
            field: "group".into(),
            message: format!("'{needle}' matches more than one group"),
        }),
        (None, _) => Err(ValidationError::NotFound {
            kind: "group",
            id: needle.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pomodoro_core::MemoryStore;

    #[test]
    fn resolves_by_name_or_prefix_but_not_blank() {
        let mut controller = Controller::load(Box::new(MemoryStore::new())).unwrap();
        let group = controller.add_group("Work").unwrap();

        assert_eq!(resolve_group_id(&controller, "work").unwrap(), group.id);
        assert_eq!(resolve_group_id(&controller, &group.id[..9]).unwrap(), group.id);
        for needle in ["", " "] {
            assert_eq!(
                resolve_group_id(&controller, needle),
                Err(ValidationError::EmptyName { field: "group id" })
            );
        }
        assert!(matches!(
            resolve_group_id(&controller, "Home"),
            Err(ValidationError::NotFound { kind: "group", .. })
        ));
    }
}
