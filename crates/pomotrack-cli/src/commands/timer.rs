use std::io::Write;
use std::rc::Rc;
use std::time::Duration;

use clap::Subcommand;
use pomotrack_core::storage::AlertsConfig;
use pomotrack_core::{
    format_countdown, Config, Event, IntervalClock, LocalCalendar, Mode, Pomodoro, SqliteStore,
};
use tokio::time::MissedTickBehavior;
use tracing::debug;

use super::{open_store, CliResult};

type App = Pomodoro<Rc<SqliteStore>, IntervalClock, LocalCalendar>;

/// How often the clock is polled. Ticks themselves stay one per second.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run one session in the foreground
    Run {
        /// work, short-break or long-break
        #[arg(long, default_value = "work")]
        mode: Mode,
        /// Override the configured length in minutes
        #[arg(long, conflicts_with = "seconds")]
        minutes: Option<u64>,
        /// Override the configured length in seconds
        #[arg(long)]
        seconds: Option<u64>,
    },
    /// Show the configured length of each mode
    Presets,
}

pub fn run(action: TimerAction) -> CliResult {
    let config = Config::load_or_default();

    match action {
        TimerAction::Run {
            mode,
            minutes,
            seconds,
        } => {
            let duration_secs = match (minutes, seconds) {
                (Some(m), _) => m.saturating_mul(60),
                (None, Some(s)) => s,
                (None, None) => config.timer.duration_secs(mode),
            };
            run_session(&config, mode, duration_secs)
        }
        TimerAction::Presets => {
            for mode in Mode::ALL {
                println!(
                    "{:<12}{}",
                    mode.label(),
                    format_countdown(config.timer.duration_secs(mode))
                );
            }
            Ok(())
        }
    }
}

fn run_session(config: &Config, mode: Mode, duration_secs: u64) -> CliResult {
    let mut app: App = Pomodoro::new(
        open_store()?,
        IntervalClock::default(),
        LocalCalendar,
        config.timer.clone(),
    );
    if app.select_mode(mode, duration_secs).is_none() {
        return Err("session length must be at least one second".into());
    }

    debug!(?mode, duration_secs, "starting session");

    let alerts = config.alerts.clone();
    app.subscribe(move |event: &Event| render(event, mode, &alerts));
    app.start();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    runtime.block_on(drive(&mut app))
}

/// Pump the clock until the session completes.
async fn drive(app: &mut App) -> CliResult {
    let mut poll = tokio::time::interval(POLL_INTERVAL);
    poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        poll.tick().await;
        let events = app.pump()?;
        if events
            .iter()
            .any(|e| matches!(e, Event::SessionCompleted { .. }))
        {
            return Ok(());
        }
    }
}

fn render(event: &Event, mode: Mode, alerts: &AlertsConfig) {
    let mut out = std::io::stdout();
    match event {
        Event::TimerStarted { remaining_secs, .. } | Event::TimerTick { remaining_secs } => {
            let _ = write!(out, "\r{:<12}{}", mode.label(), format_countdown(*remaining_secs));
        }
        Event::SessionCompleted { mode, .. } => {
            let _ = writeln!(out, "\r{:<12}{}", mode.label(), format_countdown(0));
            if alerts.enabled {
                let _ = writeln!(out, "{}", mode.completion_message());
            }
            if alerts.bell {
                let _ = write!(out, "\x07");
            }
        }
        Event::ProgressRecorded {
            today_count,
            total,
            streak,
            ..
        } => {
            let _ = writeln!(out, "Today: {today_count}  Total: {total}  Streak: {streak}");
        }
        _ => {}
    }
    let _ = out.flush();
}
