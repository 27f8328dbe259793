//! Application wiring.
//!
//! [`Pomodoro`] owns the single timer, the progress ledger and the task list
//! for one running application. Timer events are fanned out to subscribers;
//! completed work sessions are written to the ledger on the calendar's
//! current date.

use tracing::debug;

use crate::clock::{Calendar, ClockSource, LocalCalendar};
use crate::error::Result;
use crate::events::Event;
use crate::ledger::{ProgressLedger, ProgressSummary};
use crate::storage::{KvStore, TimerConfig};
use crate::tasks::TaskList;
use crate::timer::{Mode, TimerMachine};

/// Observer callback. Called once per published event, in registration order.
pub type Subscriber = Box<dyn FnMut(&Event)>;

/// One running application: the timer, the progress ledger and the task list
/// over a shared store.
///
/// Timer commands are forwarded to [`TimerMachine`] and every accepted
/// transition is published to subscribers before it is returned. Work
/// completions are recorded on `calendar.today()`.
pub struct Pomodoro<S, C, K = LocalCalendar> {
    timer: TimerMachine<C>,
    ledger: ProgressLedger<S>,
    tasks: TaskList<S>,
    calendar: K,
    timer_config: TimerConfig,
    subscribers: Vec<Subscriber>,
}

impl<S, C, K> Pomodoro<S, C, K>
where
    S: KvStore + Clone,
    C: ClockSource,
    K: Calendar,
{
    /// Load persisted state from `store` and set the timer up for a work
    /// session of the configured length.
    pub fn new(store: S, clock: C, calendar: K, timer_config: TimerConfig) -> Self {
        let mut timer =
            TimerMachine::new(clock).with_auto_reset_delay(timer_config.auto_reset_delay_secs);
        timer.select_mode(Mode::Work, timer_config.duration_secs(Mode::Work));
        Self {
            timer,
            ledger: ProgressLedger::load(store.clone()),
            tasks: TaskList::load(store),
            calendar,
            timer_config,
            subscribers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, subscriber: impl FnMut(&Event) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn timer(&self) -> &TimerMachine<C> {
        &self.timer
    }

    pub fn ledger(&self) -> &ProgressLedger<S> {
        &self.ledger
    }

    pub fn tasks(&self) -> &TaskList<S> {
        &self.tasks
    }

    /// The task list is driven directly by user actions.
    pub fn tasks_mut(&mut self) -> &mut TaskList<S> {
        &mut self.tasks
    }

    pub fn calendar(&self) -> &K {
        &self.calendar
    }

    pub fn calendar_mut(&mut self) -> &mut K {
        &mut self.calendar
    }

    pub fn clock_mut(&mut self) -> &mut C {
        self.timer.clock_mut()
    }

    pub fn summary(&self) -> ProgressSummary {
        self.ledger.summary(self.calendar.today())
    }

    // ── Timer commands ───────────────────────────────────────────────

    pub fn select_mode(&mut self, mode: Mode, duration_secs: u64) -> Option<Event> {
        let event = self.timer.select_mode(mode, duration_secs)?;
        self.publish(&event);
        Some(event)
    }

    /// Select `mode` with its configured length.
    pub fn use_preset(&mut self, mode: Mode) -> Option<Event> {
        self.select_mode(mode, self.timer_config.duration_secs(mode))
    }

    pub fn start(&mut self) -> Option<Event> {
        let event = self.timer.start()?;
        self.publish(&event);
        Some(event)
    }

    pub fn pause(&mut self) -> Option<Event> {
        let event = self.timer.pause()?;
        self.publish(&event);
        Some(event)
    }

    pub fn reset(&mut self) -> Option<Event> {
        let event = self.timer.reset()?;
        self.publish(&event);
        Some(event)
    }

    /// Advance the timer by one unit.
    ///
    /// # Errors
    /// Returns the storage error if a work completion could not be recorded.
    /// The completion event has already been published at that point.
    pub fn tick(&mut self) -> Result<Vec<Event>> {
        match self.timer.tick() {
            Some(event) => self.dispatch(event),
            None => Ok(Vec::new()),
        }
    }

    /// Apply every tick the clock reports as due.
    ///
    /// # Errors
    /// Returns the first failed ledger write. The timer has already applied
    /// every due tick, so the remaining events are still published first.
    pub fn pump(&mut self) -> Result<Vec<Event>> {
        let mut events = Vec::new();
        let mut failure = None;
        for event in self.timer.pump() {
            match self.dispatch(event) {
                Ok(batch) => events.extend(batch),
                Err(e) => {
                    failure.get_or_insert(e);
                }
            }
        }
        match failure {
            Some(e) => Err(e),
            None => Ok(events),
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn dispatch(&mut self, event: Event) -> Result<Vec<Event>> {
        self.publish(&event);
        let mut events = vec![event];
        if let Event::SessionCompleted { mode, .. } = events[0] {
            if mode.is_work() {
                let date = self.calendar.today();
                self.ledger.record_completion(date)?;
                let recorded = Event::ProgressRecorded {
                    date,
                    today_count: self.ledger.today_count(date),
                    total: self.ledger.total(),
                    streak: self.ledger.streak(),
                };
                self.publish(&recorded);
                events.push(recorded);
            } else {
                debug!(?mode, "break completion not recorded");
            }
        }
        Ok(events)
    }

    fn publish(&mut self, event: &Event) {
        for subscriber in &mut self.subscribers {
            subscriber(event);
        }
    }
}
