use chrono::{DateTime, Utc};
use clap::Subcommand;
use serde::Serialize;
use splitclock_core::format::format_elapsed;
use splitclock_core::stats::lap_rows;
use splitclock_core::{Config, Database, HistoryLog, LapRow, SplitSummary, WorkoutRecord};

use crate::host::CliResult;

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List saved workouts, newest first
    List,
    /// Show one workout with its lap table
    Show {
        /// Position in the list (0 = newest)
        index: usize,
    },
    /// Delete all saved workouts
    Clear,
}

#[derive(Serialize)]
struct WorkoutEntry {
    index: usize,
    id: String,
    recorded_at: DateTime<Utc>,
    total_time_ms: u64,
    total_time: String,
    lap_count: usize,
    summary: Option<SplitSummary>,
}

impl WorkoutEntry {
    fn new(index: usize, record: &WorkoutRecord, show_ms: bool) -> Self {
        Self {
            index,
            id: record.id.to_string(),
            recorded_at: record.recorded_at,
            total_time_ms: record.total_time_ms,
            total_time: format_elapsed(record.total_time_ms, show_ms),
            lap_count: record.laps.len(),
            summary: SplitSummary::from_laps(&record.laps),
        }
    }
}

#[derive(Serialize)]
struct WorkoutDetail {
    #[serde(flatten)]
    entry: WorkoutEntry,
    laps: Vec<LapRow>,
}

pub fn run(action: HistoryAction) -> CliResult {
    let mut db = Database::open()?;
    let show_ms = Config::load_or_default().display.show_milliseconds;

    match action {
        HistoryAction::List => {
            let entries: Vec<WorkoutEntry> = db
                .list()?
                .iter()
                .enumerate()
                .map(|(i, r)| WorkoutEntry::new(i, r, show_ms))
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        HistoryAction::Show { index } => {
            let record = db.get(index)?;
            let detail = WorkoutDetail {
                entry: WorkoutEntry::new(index, &record, show_ms),
                laps: lap_rows(&record.laps),
            };
            println!("{}", serde_json::to_string_pretty(&detail)?);
        }
        HistoryAction::Clear => {
            db.clear()?;
            println!("history cleared");
        }
    }
    Ok(())
}
