//! Notification and audio collaborators.
//!
//! The controller talks to these through traits; views plug in real
//! implementations (desktop notifications, terminal bell) and tests plug in
//! recorders. Delivery failures are logged and swallowed.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{CoreError, Result};
use crate::timer::Phase;

/// Short sound played on start and on phase completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Start,
    End,
}

pub trait CuePlayer {
    fn play(&self, cue: Cue) -> Result<()>;
}

pub trait Notifier {
    /// Whether the platform can show notifications at all.
    fn is_supported(&self) -> bool {
        true
    }

    fn notify(&self, title: &str, body: &str) -> Result<()>;
}

/// Does nothing. Used when a capability is switched off.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl CuePlayer for Silent {
    fn play(&self, _cue: Cue) -> Result<()> {
        Ok(())
    }
}

impl Notifier for Silent {
    fn is_supported(&self) -> bool {
        false
    }

    fn notify(&self, _title: &str, _body: &str) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Permission {
    #[default]
    Default,
    Granted,
    Denied,
}

/// Decides whether a notification should actually be delivered.
///
/// Notifications go out only when the user enabled them, permission was
/// granted, and the application is not focused.
pub struct NotificationGate {
    notifier: Box<dyn Notifier>,
    permission: Permission,
    enabled: bool,
    focused: Box<dyn Fn() -> bool>,
}

impl NotificationGate {
    pub fn new(notifier: Box<dyn Notifier>) -> Self {
        Self {
            notifier,
            permission: Permission::Default,
            enabled: false,
            focused: Box::new(|| false),
        }
    }

    /// Check used to tell whether the app currently has the user's attention.
    pub fn with_focus_check(mut self, is_focused: impl Fn() -> bool + 'static) -> Self {
        self.focused = Box::new(is_focused);
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn permission(&self) -> Permission {
        self.permission
    }

    /// Turn notifications on. Unsupported platforms report an error here,
    /// and only here; otherwise the feature stays silently off.
    pub fn enable(&mut self) -> Result<()> {
        if !self.notifier.is_supported() {
            return Err(CoreError::Unsupported {
                capability: "desktop notifications",
            });
        }
        if self.permission == Permission::Default {
            // Terminal and desktop notifiers need no user prompt.
            self.permission = Permission::Granted;
        }
        self.enabled = self.permission == Permission::Granted;
        Ok(())
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn set_permission(&mut self, permission: Permission) {
        self.permission = permission;
        if permission != Permission::Granted {
            self.enabled = false;
        }
    }

    /// Deliver if allowed. Returns whether a notification was sent.
    pub fn send(&self, title: &str, body: &str) -> bool {
        if !self.enabled || self.permission != Permission::Granted || (self.focused)() {
            return false;
        }
        match self.notifier.notify(title, body) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "notification failed");
                false
            }
        }
    }
}

/// Title and body announcing the end of `phase`.
pub fn completion_message(phase: Phase, completed_focus_count: u32) -> (String, String) {
    match phase {
        Phase::Focus => (
            "Focus Session Complete!".to_string(),
            format!(
                "Well done! You've completed {completed_focus_count} pomodoros. Time for a break."
            ),
        ),
        Phase::ShortBreak | Phase::LongBreak => (
            "Break Complete!".to_string(),
            "Break time is over. Ready to focus again?".to_string(),
        ),
    }
}

/// Captures everything it is asked to deliver. Useful for tests and previews.
#[derive(Debug, Default, Clone)]
pub struct Recorder {
    pub cues: Rc<RefCell<Vec<Cue>>>,
    pub notifications: Rc<RefCell<Vec<(String, String)>>>,
}

impl CuePlayer for Recorder {
    fn play(&self, cue: Cue) -> Result<()> {
        self.cues.borrow_mut().push(cue);
        Ok(())
    }
}

impl Notifier for Recorder {
    fn notify(&self, title: &str, body: &str) -> Result<()> {
        self.notifications
            .borrow_mut()
            .push((title.to_string(), body.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Broken;

    impl Notifier for Broken {
        fn notify(&self, _title: &str, _body: &str) -> Result<()> {
            Err(std::io::Error::other("dbus gone").into())
        }
    }

    #[test]
    fn gate_is_off_until_enabled() {
        let rec = Recorder::default();
        let mut gate = NotificationGate::new(Box::new(rec.clone()));
        assert!(!gate.send("t", "b"));
        gate.enable().unwrap();
        assert!(gate.send("t", "b"));
        assert_eq!(rec.notifications.borrow().len(), 1);
    }

    #[test]
    fn focused_app_suppresses_notifications() {
        let focused = Rc::new(Cell::new(true));
        let seen = focused.clone();
        let rec = Recorder::default();
        let mut gate = NotificationGate::new(Box::new(rec.clone())).with_focus_check(move || seen.get());
        gate.enable().unwrap();
        assert!(!gate.send("t", "b"));
        focused.set(false);
        assert!(gate.send("t", "b"));
    }

    #[test]
    fn unsupported_platform_errors_only_on_enable() {
        let mut gate = NotificationGate::new(Box::new(Silent));
        assert!(!gate.send("t", "b"));
        assert!(matches!(gate.enable(), Err(CoreError::Unsupported { .. })));
        assert!(!gate.is_enabled());
    }

    #[test]
    fn denied_permission_keeps_gate_closed() {
        let mut gate = NotificationGate::new(Box::new(Recorder::default()));
        gate.set_permission(Permission::Denied);
        gate.enable().unwrap();
        assert!(!gate.is_enabled());
        assert!(!gate.send("t", "b"));
    }

    #[test]
    fn disable_closes_gate_but_keeps_permission() {
        let rec = Recorder::default();
        let mut gate = NotificationGate::new(Box::new(rec.clone()));
        assert_eq!(gate.permission(), Permission::Default);
        gate.enable().unwrap();
        assert_eq!(gate.permission(), Permission::Granted);

        gate.disable();
        assert!(!gate.is_enabled());
        assert_eq!(gate.permission(), Permission::Granted);
        assert!(!gate.send("t", "b"));
        assert!(rec.notifications.borrow().is_empty());

        gate.enable().unwrap();
        assert!(gate.send("t", "b"));
    }

    #[test]
    fn delivery_failure_is_swallowed() {
        let mut gate = NotificationGate::new(Box::new(Broken));
        gate.enable().unwrap();
        assert!(!gate.send("t", "b"));
    }

    #[test]
    fn completion_messages() {
        let (title, body) = completion_message(Phase::Focus, 3);
        assert_eq!(title, "Focus Session Complete!");
        assert!(body.contains("completed 3 pomodoros"));
        let (title, _) = completion_message(Phase::LongBreak, 4);
        assert_eq!(title, "Break Complete!");
    }
}
