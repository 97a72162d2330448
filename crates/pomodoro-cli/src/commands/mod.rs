//! Subcommand implementations.
//!
//! Every one-shot command opens the database, loads a [`Controller`],
//! applies one operation (which persists itself) and prints the result.

pub mod background;
pub mod config;
pub mod group;
pub mod history;
pub mod run;
pub mod settings;
pub mod stats;
pub mod task;

use pomodoro_core::{Controller, Database};

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Load the controller backed by the on-disk database.
pub fn open_controller() -> Result<Controller, pomodoro_core::CoreError> {
    let db = Database::open()?;
    Controller::load(Box::new(db))
}
