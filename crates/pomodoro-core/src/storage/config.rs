//! TOML-based application configuration.
//!
//! Stores presentation preferences that have no bearing on timer
//! correctness:
//! - Notification and audio cue toggles
//! - Background (gradient, image or video)
//! - Default log level
//!
//! Configuration is stored at `<data dir>/config.toml`. Timer durations live
//! in the `settings` blob instead (see [`crate::timer::TimerConfig`]).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::background::Background;
use crate::error::{ConfigError, Result};

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// User toggle; permission and platform support are checked separately.
    #[serde(default)]
    pub enabled: bool,
    /// How long a desktop notification stays up.
    #[serde(default = "default_dismiss_after_secs")]
    pub dismiss_after_secs: u64,
}

/// Audio cue configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive used when `POMODORO_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data dir>/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub background: Background,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_true() -> bool {
    true
}
fn default_dismiss_after_secs() -> u64 {
    5
}
fn default_log_level() -> String {
    "warn".into()
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dismiss_after_secs: default_dismiss_after_secs(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
                    ),
                    serde_json::Value::Number(_) => value
                        .parse::<u64>()
                        .map(|n| serde_json::Value::Number(n.into()))
                        .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?,
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk. A missing file yields defaults; a malformed one is
    /// logged and also yields defaults without being overwritten.
    pub fn load() -> Self {
        let path = match Self::path() {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(error = %e, "no data directory, using default config");
                return Self::default();
            }
        };
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "malformed config, using defaults");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the result is not a valid configuration.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json)
            .map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        updated.background.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a value by dot-separated key and save.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.apply(key, value)?;
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::background::{BackgroundKind, GRADIENT_PRESETS};

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert!(!parsed.notifications.enabled);
        assert_eq!(parsed.notifications.dismiss_after_secs, 5);
        assert!(parsed.audio.enabled);
        assert_eq!(parsed.logging.level, "warn");
        assert_eq!(parsed.background.kind, BackgroundKind::Gradient);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let parsed: Config = toml::from_str("[audio]\nenabled = false\n").unwrap();
        assert!(!parsed.audio.enabled);
        assert_eq!(parsed.notifications.dismiss_after_secs, 5);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("audio.enabled").as_deref(), Some("true"));
        assert_eq!(cfg.get("notifications.dismiss_after_secs").as_deref(), Some("5"));
        assert_eq!(cfg.get("background.kind").as_deref(), Some("gradient"));
        assert!(cfg.get("audio.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn apply_updates_nested_values() {
        let mut cfg = Config::default();
        cfg.apply("notifications.enabled", "true").unwrap();
        cfg.apply("notifications.dismiss_after_secs", "8").unwrap();
        cfg.apply("logging.level", "debug").unwrap();
        assert!(cfg.notifications.enabled);
        assert_eq!(cfg.notifications.dismiss_after_secs, 8);
        assert_eq!(cfg.logging.level, "debug");
    }

    #[test]
    fn apply_rejects_unknown_key_and_bad_type() {
        let mut cfg = Config::default();
        assert!(cfg.apply("audio.nonexistent_key", "x").is_err());
        assert!(cfg.apply("audio.enabled", "not_a_bool").is_err());
        assert!(cfg.apply("notifications.dismiss_after_secs", "-1").is_err());
        assert!(cfg.audio.enabled);
    }

    #[test]
    fn apply_validates_background() {
        let mut cfg = Config::default();
        assert!(cfg.apply("background.kind", "sepia").is_err());
        cfg.apply("background.image", "https://example.com/lake.jpg").unwrap();
        cfg.apply("background.kind", "image").unwrap();
        assert_eq!(cfg.background.kind, BackgroundKind::Image);

        assert!(cfg.apply("background.image", "").is_err());
        assert_eq!(cfg.background.image, "https://example.com/lake.jpg");
    }

    #[test]
    fn apply_rejects_non_preset_gradient() {
        let mut cfg = Config::default();
        assert!(cfg.apply("background.gradient", "bg-red-500").is_err());
        assert_eq!(cfg.background.gradient, GRADIENT_PRESETS[0]);

        cfg.apply("background.gradient", GRADIENT_PRESETS[2]).unwrap();
        assert_eq!(cfg.background.gradient, GRADIENT_PRESETS[2]);
    }
}
