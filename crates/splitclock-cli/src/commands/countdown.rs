use std::io::Write;
use std::time::Duration;

use clap::Subcommand;
use serde::Serialize;
use splitclock_core::format::format_countdown;
use splitclock_core::{
    Config, Countdown, CountdownState, DurationInput, Event, TickEngine, TICK_PERIOD_MS,
};
use tokio::time::{Instant, MissedTickBehavior};

use crate::host::{CliResult, Host};

const ENGINE_KEY: &str = "countdown";

#[derive(Subcommand)]
pub enum CountdownAction {
    /// Set the per-set duration (only while configuring)
    Configure {
        /// Minutes, clamped to 0..=99
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        minutes: i64,
        /// Seconds, clamped to 0..=59
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        seconds: i64,
    },
    /// Use a preset by label (e.g. "3m") or a number of seconds
    Preset { name: String },
    /// Set the number of sets, clamped to 1..=99
    Sets {
        #[arg(allow_hyphen_values = true)]
        n: i64,
    },
    /// Start or resume
    Start,
    /// Pause
    Pause,
    /// Start if paused, pause if running
    Toggle,
    /// Back to configuring with no sets done
    Reset,
    /// Print current state as JSON
    Status,
    /// Run in the foreground until all sets finish (Ctrl-C pauses)
    Run,
}

#[derive(Serialize)]
struct CountdownStatus {
    state: CountdownState,
    editable: bool,
    remaining_ms: u64,
    remaining: String,
    configured_ms: u64,
    progress_pct: f64,
    completed_sets: u32,
    target_sets: u32,
    rest_remaining_ms: Option<u64>,
    events: Vec<Event>,
}

impl CountdownStatus {
    fn new(cd: &Countdown, events: Vec<Event>) -> Self {
        Self {
            state: cd.state(),
            editable: cd.is_configuring(),
            remaining_ms: cd.remaining_ms(),
            remaining: format_countdown(cd.remaining_ms()),
            configured_ms: cd.configured_ms(),
            progress_pct: cd.progress_percent(),
            completed_sets: cd.completed_sets(),
            target_sets: cd.target_sets(),
            rest_remaining_ms: cd.rest_remaining_ms(),
            events,
        }
    }
}

pub fn run(action: CountdownAction) -> CliResult {
    let mut host = Host::open()?;
    let (mut cd, mut events) = host.load(ENGINE_KEY, Config::countdown)?;

    let produced = match action {
        CountdownAction::Configure { minutes, seconds } => {
            cd.configure(DurationInput::clamped(minutes, seconds))
        }
        CountdownAction::Preset { name } => {
            let seconds = host
                .config
                .preset(&name)
                .ok_or_else(|| format!("unknown preset: {name}"))?;
            cd.select_preset(seconds)
        }
        CountdownAction::Sets { n } => cd.set_target_sets(n),
        CountdownAction::Start => cd.start(),
        CountdownAction::Pause => cd.pause(),
        CountdownAction::Toggle => cd.toggle(),
        CountdownAction::Reset => cd.reset(),
        CountdownAction::Status => Vec::new(),
        CountdownAction::Run => {
            let runtime = tokio::runtime::Runtime::new()?;
            let result = runtime.block_on(drive(&mut cd, &mut host));
            host.save(ENGINE_KEY, &cd)?;
            return result;
        }
    };

    host.route(produced.clone())?;
    host.save(ENGINE_KEY, &cd)?;

    events.extend(produced);
    println!(
        "{}",
        serde_json::to_string_pretty(&CountdownStatus::new(&cd, events))?
    );
    Ok(())
}

/// Foreground host loop: tick every nominal period with the measured delta,
/// print each event as a JSON line and a live readout on stderr.
async fn drive(cd: &mut Countdown, host: &mut Host) -> CliResult {
    if !cd.wants_tick() {
        let started = cd.start();
        if started.is_empty() {
            return Err("countdown cannot start: configure a duration or reset first".into());
        }
        emit(host, started)?;
    }

    let mut interval = tokio::time::interval(Duration::from_millis(TICK_PERIOD_MS));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last = Instant::now();
    let mut shown = String::new();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let elapsed = Instant::now().duration_since(last);
                let delta = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
                if delta == 0 {
                    continue;
                }
                // Carry the sub-millisecond remainder into the next tick.
                last += Duration::from_millis(delta);

                let events = cd.tick(delta);
                if !events.is_empty() {
                    eprintln!();
                    shown.clear();
                    emit(host, events)?;
                }

                let readout = match cd.state() {
                    CountdownState::Resting => format!(
                        "rest {}  set {}/{}",
                        format_countdown(cd.rest_remaining_ms().unwrap_or_default()),
                        cd.completed_sets(),
                        cd.target_sets()
                    ),
                    _ => format!(
                        "{}  set {}/{}",
                        format_countdown(cd.remaining_ms()),
                        (cd.completed_sets() + 1).min(cd.target_sets()),
                        cd.target_sets()
                    ),
                };
                if readout != shown {
                    eprint!("\r{readout}   ");
                    std::io::stderr().flush()?;
                    shown = readout;
                }

                if !cd.wants_tick() {
                    eprintln!();
                    return Ok(());
                }
            }
            _ = &mut ctrl_c => {
                eprintln!();
                let paused = cd.pause();
                emit(host, paused)?;
                return Ok(());
            }
        }
    }
}

fn emit(host: &mut Host, events: Vec<Event>) -> CliResult {
    for event in &events {
        println!("{}", serde_json::to_string(event)?);
    }
    host.route(events)
}
