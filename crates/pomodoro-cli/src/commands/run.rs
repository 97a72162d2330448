//! Foreground timer loop and one-shot status.

use std::io::Write;

use clap::Args;
use pomodoro_core::notify::Silent;
use pomodoro_core::{Command, Config, Controller, CuePlayer, Event, NotificationGate, Phase, Ticker};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use super::{open_controller, CmdResult};
use crate::desktop::{DesktopNotifier, TerminalBell};

#[derive(Args)]
pub struct RunArgs {
    /// Switch to this phase before starting (focus, short-break, long-break)
    #[arg(long)]
    mode: Option<Phase>,
    /// Load the timer paused instead of starting it
    #[arg(long)]
    paused: bool,
}

const KEY_HELP: &str = "keys: <enter>/p toggle, r reset, f focus, s short break, l long break, q quit";

pub fn run(args: RunArgs) -> CmdResult {
    let config = Config::load();
    let mut controller = with_collaborators(open_controller()?, &config);
    if let Some(phase) = args.mode {
        controller.change_mode(phase);
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(drive(&mut controller, !args.paused));
    // The stdin reader may still be parked in a blocking read.
    runtime.shutdown_background();

    println!();
    tracing::info!(
        completed_focus_count = controller.engine().completed_focus_count(),
        "timer stopped"
    );
    Ok(())
}

pub fn status() -> CmdResult {
    let controller = open_controller()?;
    println!("{}", serde_json::to_string_pretty(&controller.snapshot())?);
    Ok(())
}

fn with_collaborators(controller: Controller, config: &Config) -> Controller {
    let cues: Box<dyn CuePlayer> = if config.audio.enabled {
        Box::new(TerminalBell)
    } else {
        Box::new(Silent)
    };

    let mut gate = NotificationGate::new(Box::new(DesktopNotifier::new(
        config.notifications.dismiss_after_secs,
    )));
    if config.notifications.enabled {
        if let Err(e) = gate.enable() {
            eprintln!("notifications disabled: {e}");
        }
    }

    controller.with_cue_player(cues).with_notifications(gate)
}

async fn drive(controller: &mut Controller, autostart: bool) {
    let (tx, rx) = mpsc::channel(16);

    let keys = tx.clone();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let Some(command) = parse_key(&line) else {
                eprintln!("{KEY_HELP}");
                continue;
            };
            if keys.send(command).await.is_err() || command == Command::Quit {
                break;
            }
        }
    });

    let signal = tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = signal.send(Command::Quit).await;
        }
    });

    eprintln!("{KEY_HELP}");
    let first = if autostart { Command::Start } else { Command::Status };
    if tx.send(first).await.is_err() {
        return;
    }
    drop(tx);

    Ticker::new().run(controller, rx, render).await;
}

fn parse_key(line: &str) -> Option<Command> {
    match line.trim() {
        "" | "p" => Some(Command::Toggle),
        "r" => Some(Command::Reset),
        "f" => Some(Command::ChangeMode(Phase::Focus)),
        "s" => Some(Command::ChangeMode(Phase::ShortBreak)),
        "l" => Some(Command::ChangeMode(Phase::LongBreak)),
        "q" => Some(Command::Quit),
        _ => None,
    }
}

fn render(event: &Event, controller: &Controller) {
    let mut out = std::io::stdout().lock();
    let result = match event {
        Event::StateSnapshot { .. } => {
            write!(out, "\r\x1b[2K{}", status_line(controller)).and_then(|()| out.flush())
        }
        Event::PhaseCompleted {
            phase,
            completed_focus_count,
            ..
        } => writeln!(
            out,
            "\r\x1b[2K{} complete ({completed_focus_count} focus sessions so far)",
            phase.label()
        ),
        Event::PhaseChanged { to, running, .. } => {
            let state = if *running { "" } else { " (paused)" };
            writeln!(out, "\r\x1b[2K-> {}{state}", to.label())
        }
        other => {
            tracing::debug!(event = ?other, "timer event");
            Ok(())
        }
    };
    if let Err(e) = result {
        tracing::warn!(error = %e, "failed to write to terminal");
    }
}

fn status_line(controller: &Controller) -> String {
    let engine = controller.engine();
    let state = if engine.is_running() { "running" } else { "paused" };
    let mut line = format!(
        "{:<11} {} {:>5.1}%  {state}  #{}",
        engine.phase().label(),
        engine.display(),
        engine.progress_pct(),
        engine.completed_focus_count()
    );
    if let Some(task) = controller.tasks().current() {
        line.push_str(&format!("  [{}]", task.name));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_map_to_commands() {
        assert_eq!(parse_key(""), Some(Command::Toggle));
        assert_eq!(parse_key("p\n"), Some(Command::Toggle));
        assert_eq!(parse_key("r"), Some(Command::Reset));
        assert_eq!(parse_key(" l "), Some(Command::ChangeMode(Phase::LongBreak)));
        assert_eq!(parse_key("q"), Some(Command::Quit));
        assert_eq!(parse_key("x"), None);
    }
}
