//! The CLI as a host loop.
//!
//! Each invocation is one step of a very slow host: load the engine saved by
//! the previous invocation, tick it by the wall-clock time that passed since
//! then, apply the command, route events, save. Engines are stored as JSON
//! in the database `kv` table next to the timestamp of their last tick.

use std::error::Error;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use splitclock_core::{
    dispatch, Config, Database, Event, HapticPattern, NotificationSink, TickEngine,
};

pub type CliResult<T = ()> = Result<T, Box<dyn Error>>;

#[derive(Serialize, Deserialize)]
struct StoredEngine<E> {
    engine: E,
    /// Set while the engine wants ticks.
    #[serde(default)]
    last_tick_epoch_ms: Option<u64>,
}

/// Renders feedback on a terminal: the alarm rings the bell, the rest is
/// logged.
#[derive(Debug, Default)]
pub struct TerminalSink;

impl NotificationSink for TerminalSink {
    fn notify(&mut self, event: &Event) {
        match event {
            Event::Alarm => eprint!("\x07"),
            Event::Haptic { pattern } => {
                let pulses = pattern.durations_ms();
                match pattern {
                    HapticPattern::Short => tracing::debug!(?pulses, "vibrate"),
                    HapticPattern::Alarm => tracing::info!(?pulses, "vibrate"),
                }
            }
            Event::Click => tracing::debug!("click"),
            _ => {}
        }
    }
}

pub struct Host {
    pub db: Database,
    pub config: Config,
    sink: TerminalSink,
}

impl Host {
    pub fn open() -> CliResult<Self> {
        Ok(Self {
            db: Database::open()?,
            config: Config::load_or_default(),
            sink: TerminalSink,
        })
    }

    /// Load the engine stored under `key` (or build a fresh one) and catch
    /// it up to the present. Returns the events raised while catching up.
    pub fn load<E, F>(&mut self, key: &str, fresh: F) -> CliResult<(E, Vec<Event>)>
    where
        E: TickEngine + DeserializeOwned,
        F: FnOnce(&Config) -> E,
    {
        let stored = match self.db.kv_get(key)? {
            Some(json) => match serde_json::from_str::<StoredEngine<E>>(&json) {
                Ok(stored) => Some(stored),
                Err(err) => {
                    tracing::warn!(key, %err, "discarding unreadable engine state");
                    None
                }
            },
            None => None,
        };

        let Some(StoredEngine {
            mut engine,
            last_tick_epoch_ms,
        }) = stored
        else {
            return Ok((fresh(&self.config), Vec::new()));
        };

        let events = match last_tick_epoch_ms {
            Some(last) => catch_up(&mut engine, now_ms().saturating_sub(last)),
            None => Vec::new(),
        };
        self.route(events.clone())?;
        Ok((engine, events))
    }

    pub fn save<E>(&self, key: &str, engine: &E) -> CliResult
    where
        E: TickEngine + Serialize,
    {
        let stored = StoredEngine {
            engine,
            last_tick_epoch_ms: engine.wants_tick().then(now_ms),
        };
        self.db.kv_set(key, &serde_json::to_string(&stored)?)?;
        Ok(())
    }

    /// Forward events to the terminal sink and the workout history.
    pub fn route(&mut self, events: Vec<Event>) -> CliResult {
        dispatch(
            events,
            self.config.feedback_settings(),
            &mut self.sink,
            &mut self.db,
        )?;
        Ok(())
    }
}

/// Replay `delta_ms` into the engine, splitting it only at the engine's
/// edges so every completion and restart lands on its exact instant. Stops
/// early once the engine no longer wants time.
pub fn catch_up<E: TickEngine>(engine: &mut E, mut delta_ms: u64) -> Vec<Event> {
    let mut events = Vec::new();
    while delta_ms > 0 && engine.wants_tick() {
        let step = match engine.next_edge_ms() {
            Some(edge) => delta_ms.min(edge.max(1)),
            None => delta_ms,
        };
        events.extend(engine.tick(step));
        delta_ms -= step;
    }
    events
}

pub fn now_ms() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use splitclock_core::{Countdown, CountdownState, DurationInput, Stopwatch};
    use std::time::{Duration, Instant};

    #[test]
    fn catch_up_runs_through_rest_and_next_set() {
        let mut cd = Countdown::new(DurationInput::clamped(0, 1), 2);
        cd.start();
        let events = catch_up(&mut cd, 10_000);
        let alarms = events.iter().filter(|e| **e == Event::Alarm).count();
        assert_eq!(alarms, 2);
        assert_eq!(cd.state(), CountdownState::Complete);
    }

    #[test]
    fn catch_up_ignores_idle_engine() {
        let mut sw = Stopwatch::new();
        assert!(catch_up(&mut sw, 5_000).is_empty());
        assert_eq!(sw.elapsed_ms(), 0);
    }

    #[test]
    fn catch_up_month_gap_is_one_step() {
        let month_ms = 30 * 24 * 3600 * 1000;
        let mut sw = Stopwatch::new();
        sw.start();
        let started = Instant::now();
        catch_up(&mut sw, month_ms);
        assert_eq!(sw.elapsed_ms(), month_ms);
        assert!(started.elapsed() < Duration::from_millis(100));
    }

    #[test]
    fn catch_up_month_gap_finishes_countdown() {
        let mut cd = Countdown::new(DurationInput::clamped(99, 59), 99);
        cd.start();
        let started = Instant::now();
        let events = catch_up(&mut cd, 30 * 24 * 3600 * 1000);
        assert!(started.elapsed() < Duration::from_millis(500));
        assert_eq!(cd.state(), CountdownState::Complete);
        assert_eq!(cd.completed_sets(), 99);
        assert_eq!(events.iter().filter(|e| **e == Event::Alarm).count(), 99);
    }

    #[test]
    fn catch_up_accumulates_exactly() {
        let mut sw = Stopwatch::new();
        sw.start();
        catch_up(&mut sw, 12_345);
        assert_eq!(sw.elapsed_ms(), 12_345);
    }
}
