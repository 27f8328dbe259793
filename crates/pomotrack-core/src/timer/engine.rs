//! Timer state machine.
//!
//! The machine owns its [`ClockSource`] but never blocks on it. The caller
//! either polls the clock through [`TimerMachine::pump`] or drives
//! [`TimerMachine::tick`] directly.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> (Paused | Completed)
//! Paused -> Running
//! Completed -> Idle   (automatic, after the reset delay)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut timer = TimerMachine::new(IntervalClock::default());
//! timer.start();
//! // In a loop:
//! for event in timer.pump() { /* redraw */ }
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::mode::Mode;
use crate::clock::ClockSource;
use crate::events::Event;

/// Ticks between a completion and the automatic reset.
pub const DEFAULT_AUTO_RESET_DELAY: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Idle,
    Running,
    Paused,
    /// Countdown hit zero; an automatic reset is pending.
    Completed,
}

/// Countdown timer for a single mode at a time.
#[derive(Debug, Clone)]
pub struct TimerMachine<C> {
    clock: C,
    mode: Mode,
    duration_secs: u64,
    remaining_secs: u64,
    status: TimerStatus,
    auto_reset_delay: u32,
    /// Ticks left before the post-completion reset fires.
    pending_reset: Option<u32>,
}

impl<C: ClockSource> TimerMachine<C> {
    /// Create an idle machine set up for a default-length work session.
    pub fn new(clock: C) -> Self {
        let duration_secs = Mode::Work.default_duration_secs();
        Self {
            clock,
            mode: Mode::Work,
            duration_secs,
            remaining_secs: duration_secs,
            status: TimerStatus::Idle,
            auto_reset_delay: DEFAULT_AUTO_RESET_DELAY,
            pending_reset: None,
        }
    }

    /// Override the completion-to-reset delay. A delay of zero is treated as one tick.
    pub fn with_auto_reset_delay(mut self, ticks: u32) -> Self {
        self.auto_reset_delay = ticks.max(1);
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn status(&self) -> TimerStatus {
        self.status
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.status == TimerStatus::Running
    }

    /// Ticks until the automatic reset, if one is scheduled.
    pub fn pending_reset(&self) -> Option<u32> {
        self.pending_reset
    }

    /// 0.0 .. 1.0 progress through the current session.
    pub fn progress(&self) -> f64 {
        if self.duration_secs == 0 {
            return 0.0;
        }
        1.0 - (self.remaining_secs as f64 / self.duration_secs as f64)
    }

    /// Remaining time as `MM:SS`.
    pub fn countdown(&self) -> String {
        format_countdown(self.remaining_secs)
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            status: self.status,
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            duration_secs: self.duration_secs,
            countdown: self.countdown(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Switch mode and load a fresh countdown.
    ///
    /// Rejected (returns `None`) while running, or for a zero duration.
    pub fn select_mode(&mut self, mode: Mode, duration_secs: u64) -> Option<Event> {
        if self.status == TimerStatus::Running {
            debug!(?mode, "select_mode rejected while running");
            return None;
        }
        if duration_secs == 0 {
            debug!(?mode, "select_mode rejected zero duration");
            return None;
        }
        self.pending_reset = None;
        self.clock.stop();
        self.mode = mode;
        self.duration_secs = duration_secs;
        self.remaining_secs = duration_secs;
        self.status = TimerStatus::Idle;
        debug!(?mode, duration_secs, "mode selected");
        Some(Event::ModeSelected {
            mode,
            duration_secs,
        })
    }

    pub fn start(&mut self) -> Option<Event> {
        match self.status {
            TimerStatus::Idle | TimerStatus::Paused => {
                self.status = TimerStatus::Running;
                self.clock.start();
                debug!(mode = ?self.mode, remaining = self.remaining_secs, "timer started");
                Some(Event::TimerStarted {
                    mode: self.mode,
                    remaining_secs: self.remaining_secs,
                    at: Utc::now(),
                })
            }
            // Already ticking, or waiting on the automatic reset.
            TimerStatus::Running | TimerStatus::Completed => None,
        }
    }

    pub fn pause(&mut self) -> Option<Event> {
        match self.status {
            TimerStatus::Running => {
                self.status = TimerStatus::Paused;
                self.clock.stop();
                debug!(remaining = self.remaining_secs, "timer paused");
                Some(Event::TimerPaused {
                    remaining_secs: self.remaining_secs,
                    at: Utc::now(),
                })
            }
            _ => None,
        }
    }

    /// Back to idle with a full countdown. Cancels a pending automatic reset.
    pub fn reset(&mut self) -> Option<Event> {
        Some(self.reset_inner(false))
    }

    /// Advance one time unit.
    ///
    /// While running this counts down and may complete the session. While
    /// completed it counts down the pending automatic reset. Otherwise it is
    /// ignored.
    pub fn tick(&mut self) -> Option<Event> {
        match self.status {
            TimerStatus::Running => {
                self.remaining_secs = self.remaining_secs.saturating_sub(1);
                if self.remaining_secs == 0 {
                    self.status = TimerStatus::Completed;
                    self.pending_reset = Some(self.auto_reset_delay);
                    info!(mode = ?self.mode, "session completed");
                    return Some(Event::SessionCompleted {
                        mode: self.mode,
                        at: Utc::now(),
                    });
                }
                Some(Event::TimerTick {
                    remaining_secs: self.remaining_secs,
                })
            }
            TimerStatus::Completed => {
                let left = self.pending_reset?.saturating_sub(1);
                if left == 0 {
                    return Some(self.reset_inner(true));
                }
                self.pending_reset = Some(left);
                None
            }
            TimerStatus::Idle | TimerStatus::Paused => None,
        }
    }

    /// Apply every tick the clock reports as due.
    pub fn pump(&mut self) -> Vec<Event> {
        let due = self.clock.poll();
        (0..due).filter_map(|_| self.tick()).collect()
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn reset_inner(&mut self, automatic: bool) -> Event {
        self.pending_reset = None;
        self.clock.stop();
        self.status = TimerStatus::Idle;
        self.remaining_secs = self.duration_secs;
        debug!(automatic, mode = ?self.mode, "timer reset");
        Event::TimerReset {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            automatic,
            at: Utc::now(),
        }
    }
}

/// Format seconds as zero-padded `MM:SS`. Minutes are not capped at 59.
pub fn format_countdown(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
