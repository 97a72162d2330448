//! Terminal-side notification and cue implementations.

use std::io::Write;

use notify_rust::{Notification, Timeout};
use pomodoro_core::{CoreError, Cue, CuePlayer, Notifier};

/// Desktop notifications through the platform notification service.
pub struct DesktopNotifier {
    dismiss_after_ms: u32,
}

impl DesktopNotifier {
    pub fn new(dismiss_after_secs: u64) -> Self {
        let ms = dismiss_after_secs.saturating_mul(1000).min(u64::from(u32::MAX));
        Self {
            dismiss_after_ms: ms as u32,
        }
    }
}

impl Notifier for DesktopNotifier {
    fn is_supported(&self) -> bool {
        cfg!(any(
            target_os = "linux",
            target_os = "freebsd",
            target_os = "openbsd",
            target_os = "macos",
            target_os = "windows"
        ))
    }

    fn notify(&self, title: &str, body: &str) -> pomodoro_core::error::Result<()> {
        Notification::new()
            .summary(title)
            .body(body)
            .appname("pomodoro")
            .icon("alarm-clock")
            .timeout(Timeout::Milliseconds(self.dismiss_after_ms))
            .show()
            .map_err(|e| CoreError::Io(std::io::Error::other(e.to_string())))?;
        Ok(())
    }
}

/// Rings the terminal bell. Start and end sound the same.
pub struct TerminalBell;

impl CuePlayer for TerminalBell {
    fn play(&self, cue: Cue) -> pomodoro_core::error::Result<()> {
        tracing::trace!(?cue, "bell");
        let mut out = std::io::stdout().lock();
        out.write_all(b"\x07")?;
        out.flush()?;
        Ok(())
    }
}
