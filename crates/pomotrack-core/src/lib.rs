//! # pomotrack Core Library
//!
//! Session engine for the pomotrack Pomodoro timer: everything with state
//! and invariants lives here, and any front end (the bundled CLI, or a GUI)
//! subscribes to its events and draws.
//!
//! ## Architecture
//!
//! - **Timer**: a countdown state machine that never spawns threads; the
//!   owner feeds it ticks from a [`ClockSource`]
//! - **Ledger**: completed work sessions per day, running total and streak
//! - **Tasks**: a newest-first todo list
//! - **Storage**: a key-value persistence trait with SQLite and in-memory
//!   backends, plus TOML configuration
//!
//! ## Key Components
//!
//! - [`TimerMachine`]: Core timer state machine
//! - [`ProgressLedger`]: Streak and statistics persistence
//! - [`TaskList`]: Todo list persistence
//! - [`Pomodoro`]: Wires the three together for one application
//! - [`Config`]: Application configuration management

pub mod app;
pub mod clock;
pub mod error;
pub mod events;
pub mod ledger;
pub mod storage;
pub mod tasks;
pub mod timer;

pub use app::{Pomodoro, Subscriber};
pub use clock::{Calendar, ClockSource, FixedCalendar, IntervalClock, LocalCalendar, ManualClock};
pub use error::{ConfigError, CoreError, StorageError};
pub use events::Event;
pub use ledger::{DayCount, ProgressLedger, ProgressRecord, ProgressSummary};
pub use storage::{Config, KvStore, MemoryStore, SqliteStore};
pub use tasks::{TaskList, TodoItem};
pub use timer::{format_countdown, Mode, TimerMachine, TimerStatus};
