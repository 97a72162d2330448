use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the three countdown modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Focus,
    ShortBreak,
    LongBreak,
}

impl Phase {
    pub fn is_break(self) -> bool {
        !matches!(self, Phase::Focus)
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Focus => "Focus Time",
            Phase::ShortBreak => "Short Break",
            Phase::LongBreak => "Long Break",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Focus => "focus",
            Phase::ShortBreak => "short-break",
            Phase::LongBreak => "long-break",
        };
        f.write_str(s)
    }
}

impl FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "focus" | "pomodoro" => Ok(Phase::Focus),
            "short-break" | "shortbreak" | "short" => Ok(Phase::ShortBreak),
            "long-break" | "longbreak" | "long" => Ok(Phase::LongBreak),
            other => Err(format!("unknown phase '{other}' (expected focus, short-break or long-break)")),
        }
    }
}

/// Phase durations and auto-start behaviour.
///
/// Persisted as JSON under the `settings` key. The aliases accept blobs
/// written by the browser build (`focus`, `shortBreak`, `autoStartPomodoros`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerConfig {
    #[serde(default = "default_focus_seconds", alias = "focus")]
    pub focus_seconds: u64,
    #[serde(default = "default_short_break_seconds", alias = "shortBreak")]
    pub short_break_seconds: u64,
    #[serde(default = "default_long_break_seconds", alias = "longBreak")]
    pub long_break_seconds: u64,
    #[serde(default = "default_true")]
    pub auto_start_breaks: bool,
    #[serde(default = "default_true", alias = "autoStartPomodoros")]
    pub auto_start_focus: bool,
    #[serde(default = "default_long_break_interval")]
    pub long_break_interval: u32,
}

fn default_focus_seconds() -> u64 {
    25 * 60
}
fn default_short_break_seconds() -> u64 {
    5 * 60
}
fn default_long_break_seconds() -> u64 {
    15 * 60
}
fn default_long_break_interval() -> u32 {
    4
}
fn default_true() -> bool {
    true
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            focus_seconds: default_focus_seconds(),
            short_break_seconds: default_short_break_seconds(),
            long_break_seconds: default_long_break_seconds(),
            auto_start_breaks: true,
            auto_start_focus: true,
            long_break_interval: default_long_break_interval(),
        }
    }
}

impl TimerConfig {
    /// Configured duration of `phase` in seconds.
    pub fn duration_secs(&self, phase: Phase) -> u64 {
        match phase {
            Phase::Focus => self.focus_seconds,
            Phase::ShortBreak => self.short_break_seconds,
            Phase::LongBreak => self.long_break_seconds,
        }
    }

    /// Replace zero durations and a zero interval with the built-in defaults.
    pub fn normalized(mut self) -> Self {
        if self.focus_seconds == 0 {
            self.focus_seconds = default_focus_seconds();
        }
        if self.short_break_seconds == 0 {
            self.short_break_seconds = default_short_break_seconds();
        }
        if self.long_break_seconds == 0 {
            self.long_break_seconds = default_long_break_seconds();
        }
        if self.long_break_interval == 0 {
            self.long_break_interval = default_long_break_interval();
        }
        self
    }

    /// Parse a persisted blob, falling back to defaults when it is malformed.
    pub fn from_json_or_default(json: &str) -> Self {
        match serde_json::from_str::<TimerConfig>(json) {
            Ok(cfg) => cfg.normalized(),
            Err(e) => {
                tracing::warn!(error = %e, "malformed timer settings, using defaults");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_pomodoro() {
        let cfg = TimerConfig::default();
        assert_eq!(cfg.focus_seconds, 1500);
        assert_eq!(cfg.short_break_seconds, 300);
        assert_eq!(cfg.long_break_seconds, 900);
        assert!(cfg.auto_start_breaks);
        assert!(cfg.auto_start_focus);
        assert_eq!(cfg.long_break_interval, 4);
    }

    #[test]
    fn reads_browser_field_names() {
        let json = r#"{"focus":3000,"shortBreak":600,"longBreak":1200,
            "autoStartBreaks":false,"autoStartPomodoros":false,"longBreakInterval":3}"#;
        let cfg = TimerConfig::from_json_or_default(json);
        assert_eq!(cfg.focus_seconds, 3000);
        assert_eq!(cfg.short_break_seconds, 600);
        assert_eq!(cfg.long_break_seconds, 1200);
        assert!(!cfg.auto_start_breaks);
        assert!(!cfg.auto_start_focus);
        assert_eq!(cfg.long_break_interval, 3);
    }

    #[test]
    fn malformed_json_falls_back_to_defaults() {
        assert_eq!(TimerConfig::from_json_or_default("{not json"), TimerConfig::default());
        assert_eq!(
            TimerConfig::from_json_or_default(r#"{"focus":-5}"#),
            TimerConfig::default()
        );
    }

    #[test]
    fn zero_values_are_replaced_per_field() {
        let cfg = TimerConfig::from_json_or_default(
            r#"{"focusSeconds":0,"shortBreakSeconds":120,"longBreakInterval":0}"#,
        );
        assert_eq!(cfg.focus_seconds, 1500);
        assert_eq!(cfg.short_break_seconds, 120);
        assert_eq!(cfg.long_break_interval, 4);
    }

    #[test]
    fn phase_parses_cli_spellings() {
        assert_eq!("focus".parse::<Phase>().unwrap(), Phase::Focus);
        assert_eq!("short-break".parse::<Phase>().unwrap(), Phase::ShortBreak);
        assert_eq!("LONG".parse::<Phase>().unwrap(), Phase::LongBreak);
        assert!("nap".parse::<Phase>().is_err());
    }

    #[test]
    fn only_focus_is_not_a_break() {
        assert!(!Phase::Focus.is_break());
        assert!(Phase::ShortBreak.is_break());
        assert!(Phase::LongBreak.is_break());
    }
}
