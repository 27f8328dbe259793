use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{Mode, TimerStatus};

/// Every state change in the core produces an Event.
/// The presentation layer subscribes to them and redraws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    ModeSelected {
        mode: Mode,
        duration_secs: u64,
    },
    TimerStarted {
        mode: Mode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerTick {
        remaining_secs: u64,
    },
    /// Countdown reached zero. Emitted exactly once per completion.
    SessionCompleted {
        mode: Mode,
        at: DateTime<Utc>,
    },
    TimerReset {
        mode: Mode,
        remaining_secs: u64,
        /// True when fired by the post-completion delay rather than the user.
        automatic: bool,
        at: DateTime<Utc>,
    },
    /// A work completion was written to the progress ledger.
    ProgressRecorded {
        date: NaiveDate,
        today_count: u32,
        total: u32,
        streak: u32,
    },
    StateSnapshot {
        status: TimerStatus,
        mode: Mode,
        remaining_secs: u64,
        duration_secs: u64,
        countdown: String,
        at: DateTime<Utc>,
    },
}
