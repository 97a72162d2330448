//! Timer settings commands for CLI.

use clap::Subcommand;
use pomodoro_core::{ConfigError, TimerConfig};
use serde_json::Value;

use super::{open_controller, CmdResult};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Get a setting (e.g. "focusSeconds", "long-break-interval")
    Get {
        /// Setting name
        key: String,
    },
    /// Set a setting
    Set {
        /// Setting name
        key: String,
        /// New value: seconds, a count, or true/false
        value: String,
    },
    /// List all settings
    List,
    /// Restore the default durations
    Reset,
}

pub fn run(action: SettingsAction) -> CmdResult {
    let mut controller = open_controller()?;

    match action {
        SettingsAction::Get { key } => {
            let json = serde_json::to_value(controller.engine().config())?;
            let key = camel_case(&key);
            let value = json.get(&key).ok_or(ConfigError::UnknownKey(key.clone()))?;
            println!("{value}");
        }
        SettingsAction::Set { key, value } => {
            let updated = with_setting(controller.engine().config(), &camel_case(&key), &value)?;
            controller.update_config(updated)?;
            println!("ok");
        }
        SettingsAction::List => {
            println!("{}", serde_json::to_string_pretty(controller.engine().config())?);
        }
        SettingsAction::Reset => {
            controller.update_config(TimerConfig::default())?;
            println!("settings reset to defaults");
        }
    }
    Ok(())
}

/// Copy of `config` with one field replaced, rejecting values the engine
/// would silently swap for defaults.
fn with_setting(config: &TimerConfig, key: &str, raw: &str) -> Result<TimerConfig, ConfigError> {
    let invalid = |message: String| ConfigError::InvalidValue {
        key: key.to_string(),
        message,
    };

    let mut json = serde_json::to_value(config).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
    let slot = json
        .get_mut(key)
        .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

    let value: Value = serde_json::from_str(raw.trim())
        .map_err(|_| invalid(format!("expected a number or true/false, got '{raw}'")))?;
    match (&*slot, &value) {
        (Value::Bool(_), Value::Bool(_)) => {}
        (Value::Number(_), Value::Number(n)) if n.as_u64().is_some_and(|n| n > 0) => {}
        (Value::Number(_), _) => return Err(invalid(format!("expected a positive integer, got '{raw}'"))),
        _ => return Err(invalid(format!("expected true or false, got '{raw}'"))),
    }
    *slot = value;

    serde_json::from_value(json).map_err(|e| invalid(e.to_string()))
}

/// `long-break-interval` and `long_break_interval` both become `longBreakInterval`.
fn camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper = false;
    for c in key.chars() {
        if c == '-' || c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
