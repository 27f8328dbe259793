use clap::Subcommand;
use pomotrack_core::{Calendar, LocalCalendar, ProgressLedger};
use serde::Serialize;

use super::{open_store, CliResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's count, total and streak
    Today,
    /// All-time stats including the average per active day
    All,
    /// Completions over the last seven days
    Week {
        /// Print JSON instead of a bar chart
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct TodayStats {
    date: chrono::NaiveDate,
    today: u32,
    total: u32,
    streak: u32,
}

#[derive(Serialize)]
struct WeekPoint {
    date: chrono::NaiveDate,
    label: String,
    count: u32,
}

pub fn run(action: StatsAction) -> CliResult {
    let ledger = ProgressLedger::load(open_store()?);
    let today = LocalCalendar.today();

    match action {
        StatsAction::Today => {
            let stats = TodayStats {
                date: today,
                today: ledger.today_count(today),
                total: ledger.total(),
                streak: ledger.streak(),
            };
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        StatsAction::All => {
            println!("{}", serde_json::to_string_pretty(&ledger.summary(today))?);
        }
        StatsAction::Week { json } => {
            let series: Vec<WeekPoint> = ledger
                .last_7_days_series(today)
                .into_iter()
                .map(|p| WeekPoint {
                    label: p.label(),
                    date: p.date,
                    count: p.count,
                })
                .collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&series)?);
            } else {
                for point in &series {
                    let bar = "#".repeat(point.count as usize);
                    println!("{:<12}{:>3} {bar}", point.label, point.count);
                }
            }
        }
    }
    Ok(())
}
