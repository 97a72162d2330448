//! # Pomodoro Core Library
//!
//! This library provides the core logic for the Pomodoro timer. Views (the
//! `pomodoro` CLI today) are thin layers over one canonical engine instance
//! owned by a [`Controller`].
//!
//! ## Architecture
//!
//! - **Timer Engine**: a tick-driven state machine cycling focus, short break
//!   and long break; the caller invokes `tick()` once per elapsed second
//! - **Task Store**: grouped tasks and subtasks, with one "current" task that
//!   completed focus sessions are credited to
//! - **Session Log / Stats**: append-only history of completed phases and
//!   timeframe aggregation over it
//! - **Storage**: JSON blobs in a SQLite key-value table, plus a TOML app config
//! - **Ticker**: the one-second scheduler that drives the controller
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`TaskStore`]: Task, subtask and group management
//! - [`Controller`]: Owner of engine, tasks, history and collaborators
//! - [`Database`]: Key-value persistence
//! - [`Config`]: Application configuration management

pub mod background;
pub mod controller;
pub mod error;
pub mod events;
pub mod history;
pub mod notify;
pub mod stats;
pub mod storage;
pub mod task;
pub mod ticker;
pub mod timer;

pub use background::{Background, BackgroundKind};
pub use controller::Controller;
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::Event;
pub use history::{SessionLog, SessionRecord};
pub use notify::{Cue, CuePlayer, NotificationGate, Notifier, Permission};
pub use stats::{StatsSummary, Timeframe};
pub use storage::{Config, Database, KvStore, MemoryStore};
pub use task::{Subtask, Task, TaskGroup, TaskStore};
pub use ticker::{Command, Ticker};
pub use timer::{Phase, PhaseCompletion, TimerConfig, TimerEngine};
