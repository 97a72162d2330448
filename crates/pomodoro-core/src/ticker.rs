//! One-second tick scheduler.
//!
//! A single repeating interval drives [`Controller::tick`] while the timer is
//! running. User commands arrive on a channel and are applied between ticks,
//! so the controller only ever sees one sequential stream of mutations.
//! Stopping is immediate: there is never in-flight work to join.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};

use crate::controller::Controller;
use crate::events::Event;
use crate::timer::Phase;

/// A user request for the run loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Toggle,
    Start,
    Pause,
    Reset,
    ChangeMode(Phase),
    /// Emit a snapshot without changing anything.
    Status,
    Quit,
}

pub struct Ticker {
    period: Duration,
}

impl Default for Ticker {
    fn default() -> Self {
        Self::new()
    }
}

impl Ticker {
    pub fn new() -> Self {
        Self {
            period: Duration::from_secs(1),
        }
    }

    /// Override the tick period; one call to `tick()` still counts as one second.
    pub fn with_period(period: Duration) -> Self {
        Self { period }
    }

    /// Drive `controller` until `Quit` arrives or every sender is dropped.
    ///
    /// `on_event` sees every event the controller produces, followed by a
    /// fresh state snapshot after each tick and each command.
    pub async fn run<F>(
        &self,
        controller: &mut Controller,
        mut commands: mpsc::Receiver<Command>,
        mut on_event: F,
    ) where
        F: FnMut(&Event, &Controller),
    {
        let mut ticks = interval(self.period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Burst);
        ticks.reset();

        loop {
            tokio::select! {
                _ = ticks.tick(), if controller.engine().is_running() => {
                    for event in controller.tick() {
                        on_event(&event, controller);
                    }
                    on_event(&controller.snapshot(), controller);
                }
                command = commands.recv() => {
                    let Some(command) = command else {
                        tracing::debug!("command channel closed, stopping ticker");
                        break;
                    };
                    if command == Command::Quit {
                        controller.pause();
                        break;
                    }
                    let was_running = controller.engine().is_running();
                    if let Some(event) = apply(controller, command) {
                        on_event(&event, controller);
                    }
                    if !was_running && controller.engine().is_running() {
                        // First tick lands one full period after (re)starting.
                        ticks.reset();
                    }
                    on_event(&controller.snapshot(), controller);
                }
            }
        }
    }
}

fn apply(controller: &mut Controller, command: Command) -> Option<Event> {
    tracing::debug!(?command, "applying command");
    match command {
        Command::Toggle => controller.toggle(),
        Command::Start => controller.start(),
        Command::Pause => controller.pause(),
        Command::Reset => Some(controller.reset()),
        Command::ChangeMode(phase) => Some(controller.change_mode(phase)),
        Command::Status | Command::Quit => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{KvStore, MemoryStore};
    use crate::timer::TimerConfig;
    use tokio::time::sleep;

    fn controller(config: TimerConfig) -> Controller {
        let store = MemoryStore::new();
        store
            .set("settings", &serde_json::to_string(&config).unwrap())
            .unwrap();
        Controller::load(Box::new(store)).unwrap()
    }

    fn quick() -> TimerConfig {
        TimerConfig {
            focus_seconds: 3,
            short_break_seconds: 2,
            long_break_seconds: 5,
            auto_start_breaks: true,
            auto_start_focus: false,
            long_break_interval: 4,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_second_and_completes_phase() {
        let mut ctl = controller(quick());
        let (tx, rx) = mpsc::channel(8);
        let mut events = Vec::new();
        let ticker = Ticker::new();

        tokio::join!(
            ticker.run(&mut ctl, rx, |event, _| events.push(event.clone())),
            async {
                tx.send(Command::Start).await.unwrap();
                sleep(Duration::from_millis(3500)).await;
                tx.send(Command::Quit).await.unwrap();
            }
        );

        let completed: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, Event::PhaseCompleted { .. }))
            .collect();
        assert_eq!(completed.len(), 1);
        assert_eq!(ctl.engine().phase(), Phase::ShortBreak);
        assert_eq!(ctl.engine().remaining_secs(), 2);
        assert_eq!(ctl.history().len(), 1);
        // Quit pauses the timer.
        assert!(!ctl.engine().is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn paused_timer_does_not_tick() {
        let mut ctl = controller(quick());
        let (tx, rx) = mpsc::channel(8);
        let ticker = Ticker::with_period(Duration::from_millis(100));

        tokio::join!(ticker.run(&mut ctl, rx, |_, _| {}), async {
            tx.send(Command::Start).await.unwrap();
            sleep(Duration::from_millis(150)).await;
            tx.send(Command::Pause).await.unwrap();
            sleep(Duration::from_secs(1)).await;
            tx.send(Command::Quit).await.unwrap();
        });

        assert_eq!(ctl.engine().phase(), Phase::Focus);
        assert_eq!(ctl.engine().remaining_secs(), 2);
        assert!(ctl.history().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_sender_stops_loop() {
        let mut ctl = controller(quick());
        let (tx, rx) = mpsc::channel(8);
        drop(tx);
        Ticker::new().run(&mut ctl, rx, |_, _| {}).await;
        assert_eq!(ctl.engine().remaining_secs(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn change_mode_command_stops_and_switches() {
        let mut ctl = controller(quick());
        let (tx, rx) = mpsc::channel(8);
        let mut snapshots = 0;
        let ticker = Ticker::with_period(Duration::from_millis(100));

        tokio::join!(
            ticker.run(&mut ctl, rx, |event, _| {
                if matches!(event, Event::StateSnapshot { .. }) {
                    snapshots += 1;
                }
            }),
            async {
                tx.send(Command::Start).await.unwrap();
                sleep(Duration::from_millis(150)).await;
                tx.send(Command::ChangeMode(Phase::LongBreak)).await.unwrap();
                sleep(Duration::from_millis(300)).await;
                tx.send(Command::Quit).await.unwrap();
            }
        );

        assert_eq!(ctl.engine().phase(), Phase::LongBreak);
        assert_eq!(ctl.engine().remaining_secs(), 5);
        // start + one tick + change_mode
        assert_eq!(snapshots, 3);
    }
}
