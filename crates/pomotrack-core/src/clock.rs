//! Time sources.
//!
//! [`ClockSource`] is the tick generator that drives the timer state machine.
//! It never calls back into the machine: the owner polls it for the number of
//! whole ticks that became due and feeds them to `tick()`. This keeps the
//! machine free of threads and lets tests advance time by hand.
//!
//! [`Calendar`] answers "what is today" for the progress ledger.

use std::time::{Duration, Instant};

use chrono::{Local, NaiveDate};

/// Produces ticks while active.
pub trait ClockSource {
    /// Begin emitting ticks. Calling `start` on an active clock is a no-op.
    fn start(&mut self);

    /// Stop emitting ticks and discard any that were not yet polled.
    fn stop(&mut self);

    fn is_active(&self) -> bool;

    /// Number of whole ticks that became due since the previous poll.
    /// Always zero while stopped.
    fn poll(&mut self) -> u32;
}

/// Wall-clock ticker with a fixed interval (one second by default).
///
/// Counts whole intervals since `start`, so a late poll delivers every tick
/// it missed rather than silently dropping them.
#[derive(Debug, Clone)]
pub struct IntervalClock {
    interval: Duration,
    started_at: Option<Instant>,
    delivered: u64,
}

impl IntervalClock {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            started_at: None,
            delivered: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    fn poll_at(&mut self, now: Instant) -> u32 {
        let Some(started) = self.started_at else {
            return 0;
        };
        let interval_ms = self.interval.as_millis().max(1);
        let elapsed = now.saturating_duration_since(started).as_millis() / interval_ms;
        let elapsed = u64::try_from(elapsed).unwrap_or(u64::MAX);
        let due = elapsed.saturating_sub(self.delivered);
        self.delivered = elapsed;
        u32::try_from(due).unwrap_or(u32::MAX)
    }
}

impl Default for IntervalClock {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl ClockSource for IntervalClock {
    fn start(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(Instant::now());
            self.delivered = 0;
        }
    }

    fn stop(&mut self) {
        self.started_at = None;
        self.delivered = 0;
    }

    fn is_active(&self) -> bool {
        self.started_at.is_some()
    }

    fn poll(&mut self) -> u32 {
        self.poll_at(Instant::now())
    }
}

/// Hand-driven clock for tests and simulations.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    active: bool,
    pending: u32,
    starts: u32,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `ticks` for the next poll. Ignored while stopped.
    pub fn advance(&mut self, ticks: u32) {
        if self.active {
            self.pending = self.pending.saturating_add(ticks);
        }
    }

    /// How many times the clock went from stopped to active.
    pub fn start_count(&self) -> u32 {
        self.starts
    }
}

impl ClockSource for ManualClock {
    fn start(&mut self) {
        if !self.active {
            self.active = true;
            self.starts += 1;
        }
    }

    fn stop(&mut self) {
        self.active = false;
        self.pending = 0;
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn poll(&mut self) -> u32 {
        std::mem::take(&mut self.pending)
    }
}

/// Source of the current calendar date.
pub trait Calendar {
    fn today(&self) -> NaiveDate;
}

/// The machine's local calendar date at call time.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalCalendar;

impl Calendar for LocalCalendar {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A calendar pinned to one date, settable by tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedCalendar(pub NaiveDate);

impl FixedCalendar {
    pub fn set(&mut self, date: NaiveDate) {
        self.0 = date;
    }
}

impl Calendar for FixedCalendar {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
