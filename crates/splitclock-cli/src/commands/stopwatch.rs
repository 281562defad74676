use clap::Subcommand;
use serde::Serialize;
use splitclock_core::format::{format_elapsed, results_text};
use splitclock_core::{
    Event, HistoryLog, LapRow, SplitSummary, Stopwatch, StopwatchState,
};

use crate::host::{CliResult, Host};

const ENGINE_KEY: &str = "stopwatch";

#[derive(Subcommand)]
pub enum StopwatchAction {
    /// Start or resume
    Start,
    /// Stop (pause) a running stopwatch
    Stop,
    /// Start if stopped, stop if running
    Toggle,
    /// Record a lap at the current time
    Lap,
    /// Reset to zero, saving the session to history if it has laps
    Reset,
    /// Print current state as JSON
    Status,
    /// Print a shareable results summary
    Summary,
    /// Load a workout from history for review
    Load {
        /// Position in `history list` (0 = newest)
        index: usize,
    },
}

#[derive(Serialize)]
struct StopwatchStatus {
    state: StopwatchState,
    elapsed_ms: u64,
    elapsed: String,
    laps: Vec<LapRow>,
    summary: Option<SplitSummary>,
    events: Vec<Event>,
}

impl StopwatchStatus {
    fn new(sw: &Stopwatch, show_ms: bool, events: Vec<Event>) -> Self {
        Self {
            state: sw.state(),
            elapsed_ms: sw.elapsed_ms(),
            elapsed: format_elapsed(sw.elapsed_ms(), show_ms),
            laps: sw.lap_rows(),
            summary: sw.summary(),
            events,
        }
    }
}

pub fn run(action: StopwatchAction) -> CliResult {
    let mut host = Host::open()?;
    let (mut sw, mut events) = host.load(ENGINE_KEY, |_| Stopwatch::new())?;
    let show_ms = host.config.display.show_milliseconds;

    let produced = match action {
        StopwatchAction::Start => sw.start(),
        StopwatchAction::Stop => sw.stop(),
        StopwatchAction::Toggle => sw.toggle(),
        StopwatchAction::Lap => sw.lap(),
        StopwatchAction::Reset => sw.reset(),
        StopwatchAction::Status => Vec::new(),
        StopwatchAction::Summary => {
            println!("{}", results_text(sw.elapsed_ms(), sw.laps(), show_ms));
            host.save(ENGINE_KEY, &sw)?;
            return Ok(());
        }
        StopwatchAction::Load { index } => {
            let record = host.db.get(index)?;
            record.validate()?;
            sw.load_workout(&record);
            Vec::new()
        }
    };

    host.route(produced.clone())?;
    host.save(ENGINE_KEY, &sw)?;

    events.extend(produced);
    let status = StopwatchStatus::new(&sw, show_ms, events);
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}
