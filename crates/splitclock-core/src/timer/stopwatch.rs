//! Stopwatch engine.
//!
//! Accumulates elapsed time from caller-supplied tick deltas and captures
//! laps. Like the countdown, it holds no threads or timers; the host calls
//! `tick(delta_ms)` with the real interval since its previous call.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused -> (reset) -> Idle
//! any  -> (load_workout) -> Reviewing -> (reset) -> Idle
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::TickEngine;
use crate::events::{Event, HapticPattern};
use crate::stats::{self, LapRow, SplitSummary};
use crate::storage::WorkoutRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopwatchState {
    Idle,
    Running,
    Paused,
    /// A session loaded from history, frozen for inspection.
    Reviewing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stopwatch {
    state: StopwatchState,
    elapsed_ms: u64,
    /// Absolute lap timestamps, strictly increasing, most recent last.
    laps: Vec<u64>,
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopwatch {
    pub fn new() -> Self {
        Self {
            state: StopwatchState::Idle,
            elapsed_ms: 0,
            laps: Vec::new(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> StopwatchState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == StopwatchState::Running
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn laps(&self) -> &[u64] {
        &self.laps
    }

    /// Split durations, derived from `laps` on every call.
    pub fn splits(&self) -> Vec<u64> {
        stats::splits(&self.laps)
    }

    /// Best/worst/average split, or `None` with no laps.
    pub fn summary(&self) -> Option<SplitSummary> {
        SplitSummary::from_laps(&self.laps)
    }

    pub fn lap_rows(&self) -> Vec<LapRow> {
        stats::lap_rows(&self.laps)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start or resume. Only effective from `Idle` or `Paused`.
    pub fn start(&mut self) -> Vec<Event> {
        match self.state {
            StopwatchState::Idle | StopwatchState::Paused => {
                debug!(elapsed_ms = self.elapsed_ms, "stopwatch running");
                self.state = StopwatchState::Running;
            }
            StopwatchState::Running | StopwatchState::Reviewing => {}
        }
        Vec::new()
    }

    /// Stop a running stopwatch, keeping elapsed time and laps.
    pub fn stop(&mut self) -> Vec<Event> {
        if self.state != StopwatchState::Running {
            return Vec::new();
        }
        debug!(elapsed_ms = self.elapsed_ms, "stopwatch paused");
        self.state = StopwatchState::Paused;
        vec![Event::Click]
    }

    /// Start/stop button semantics.
    pub fn toggle(&mut self) -> Vec<Event> {
        if self.is_running() {
            self.stop()
        } else {
            self.start()
        }
    }

    /// Capture the current elapsed time as a lap.
    ///
    /// Ignored unless running. A lap at the same instant as the previous one
    /// is also ignored so laps stay strictly increasing.
    pub fn lap(&mut self) -> Vec<Event> {
        if self.state != StopwatchState::Running {
            return Vec::new();
        }
        if self.laps.last().is_some_and(|&last| last >= self.elapsed_ms) {
            return Vec::new();
        }
        self.laps.push(self.elapsed_ms);
        debug!(lap = self.laps.len(), at_ms = self.elapsed_ms, "lap captured");
        vec![
            Event::Click,
            Event::Haptic {
                pattern: HapticPattern::Short,
            },
        ]
    }

    /// Reset to `Idle`, committing the session to history when it has laps.
    pub fn reset(&mut self) -> Vec<Event> {
        self.reset_at(Utc::now())
    }

    /// Like [`Stopwatch::reset`] with an explicit record timestamp.
    pub fn reset_at(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        let mut events = Vec::new();
        match self.state {
            StopwatchState::Idle => return events,
            StopwatchState::Running | StopwatchState::Paused => {
                if !self.laps.is_empty() {
                    let record = WorkoutRecord::new(now, self.elapsed_ms, self.laps.clone());
                    info!(
                        total_ms = record.total_time_ms,
                        laps = record.laps.len(),
                        "workout committed"
                    );
                    events.push(Event::CommitHistory { record });
                }
            }
            // Already in history; committing again would duplicate it.
            StopwatchState::Reviewing => {}
        }
        self.state = StopwatchState::Idle;
        self.elapsed_ms = 0;
        self.laps.clear();
        events
    }

    /// Reconstruct a past session for inspection.
    ///
    /// Any live session is discarded without a commit. The result never
    /// ticks; `reset` returns to `Idle`.
    pub fn load_workout(&mut self, record: &WorkoutRecord) {
        debug!(id = %record.id, "workout loaded for review");
        self.state = StopwatchState::Reviewing;
        self.elapsed_ms = record.total_time_ms;
        self.laps = record.laps.clone();
    }

    /// Advance by `delta_ms`. Only effective while running.
    pub fn tick(&mut self, delta_ms: u64) -> Vec<Event> {
        if self.state == StopwatchState::Running {
            self.elapsed_ms = self.elapsed_ms.saturating_add(delta_ms);
        }
        Vec::new()
    }
}

impl TickEngine for Stopwatch {
    fn tick(&mut self, delta_ms: u64) -> Vec<Event> {
        Stopwatch::tick(self, delta_ms)
    }

    fn wants_tick(&self) -> bool {
        self.is_running()
    }
}
