//! Multi-set countdown engine.
//!
//! Counts a configured duration down to zero, raises the alarm, and, while
//! sets remain, restarts automatically after a fixed rest. Time only moves
//! through `tick(delta_ms)`; the rest delay is consumed by ticks too, so the
//! engine owns no timers.
//!
//! ## State Transitions
//!
//! ```text
//! Configuring -> Running <-> Paused
//! Running -> (zero) -> Resting -> (rest elapsed) -> Running
//! Running -> (zero, last set) -> Complete
//! any -> (reset) -> Configuring
//! ```
//!
//! Each armed rest carries a [`RestToken`]. Any transition that leaves
//! `Resting` other than the restart itself drops the token, so a restart that
//! was scheduled before a reset or pause can never fire afterwards.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::input::{clamp_sets, DurationInput};
use super::TickEngine;
use crate::events::{Event, HapticPattern, RestToken};

/// Pause between a finished set and the automatic start of the next one.
pub const REST_DELAY_MS: u64 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountdownState {
    /// Duration editable; `remaining_ms == configured_ms`.
    Configuring,
    Running,
    Paused,
    /// Between sets, waiting for the auto-restart.
    Resting,
    /// All target sets done.
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct PendingRest {
    token: RestToken,
    remaining_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Countdown {
    state: CountdownState,
    input: DurationInput,
    configured_ms: u64,
    remaining_ms: u64,
    completed_sets: u32,
    target_sets: u32,
    #[serde(default)]
    rest: Option<PendingRest>,
    /// Last token generation handed out.
    #[serde(default)]
    generation: u64,
}

impl Default for Countdown {
    /// Five minutes, one set.
    fn default() -> Self {
        Self::new(DurationInput::clamped(5, 0), 1)
    }
}

impl Countdown {
    pub fn new(input: DurationInput, target_sets: u32) -> Self {
        let configured_ms = input.duration_ms();
        Self {
            state: CountdownState::Configuring,
            input,
            configured_ms,
            remaining_ms: configured_ms,
            completed_sets: 0,
            target_sets: clamp_sets(i64::from(target_sets)),
            rest: None,
            generation: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> CountdownState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == CountdownState::Running
    }

    /// Whether duration inputs may be edited.
    pub fn is_configuring(&self) -> bool {
        self.state == CountdownState::Configuring
    }

    pub fn input(&self) -> DurationInput {
        self.input
    }

    pub fn configured_ms(&self) -> u64 {
        self.configured_ms
    }

    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms
    }

    pub fn completed_sets(&self) -> u32 {
        self.completed_sets
    }

    pub fn target_sets(&self) -> u32 {
        self.target_sets
    }

    /// Token of the armed restart, if resting.
    pub fn pending_rest(&self) -> Option<RestToken> {
        self.rest.map(|r| r.token)
    }

    /// Rest time left before the next set starts.
    pub fn rest_remaining_ms(&self) -> Option<u64> {
        self.rest.map(|r| r.remaining_ms)
    }

    /// `remaining / configured * 100`, or 0 for a zero-length configuration.
    pub fn progress_percent(&self) -> f64 {
        if self.configured_ms == 0 {
            return 0.0;
        }
        self.remaining_ms as f64 / self.configured_ms as f64 * 100.0
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Set the per-set duration. Only effective while `Configuring`.
    pub fn configure(&mut self, input: DurationInput) -> Vec<Event> {
        if self.state != CountdownState::Configuring {
            debug!(state = ?self.state, "configure ignored outside Configuring");
            return Vec::new();
        }
        self.apply_input(input);
        Vec::new()
    }

    /// Configure from a preset length in seconds. Rejected while running.
    pub fn select_preset(&mut self, seconds: u64) -> Vec<Event> {
        if self.state == CountdownState::Running {
            return Vec::new();
        }
        let mut events = self.cancel_rest();
        self.apply_input(DurationInput::from_total_secs(seconds));
        self.state = CountdownState::Configuring;
        events.push(Event::Click);
        events
    }

    /// Start or resume.
    ///
    /// A zero-length configuration or a completed run is rejected. Starting
    /// while resting skips the rest and begins the next set immediately.
    pub fn start(&mut self) -> Vec<Event> {
        match self.state {
            CountdownState::Configuring | CountdownState::Paused => {
                if self.configured_ms == 0 {
                    return Vec::new();
                }
                debug!(remaining_ms = self.remaining_ms, "countdown running");
                self.state = CountdownState::Running;
                vec![Event::Click]
            }
            CountdownState::Resting => {
                let mut events = self.cancel_rest();
                events.extend(self.restart());
                events.push(Event::Click);
                events
            }
            CountdownState::Running | CountdownState::Complete => Vec::new(),
        }
    }

    /// Pause a running countdown.
    ///
    /// Pausing while resting cancels the restart and leaves the next set
    /// armed at full length.
    pub fn pause(&mut self) -> Vec<Event> {
        match self.state {
            CountdownState::Running => {
                debug!(remaining_ms = self.remaining_ms, "countdown paused");
                self.state = CountdownState::Paused;
                vec![Event::Click]
            }
            CountdownState::Resting => {
                let mut events = self.cancel_rest();
                self.remaining_ms = self.configured_ms;
                self.state = CountdownState::Paused;
                events.push(Event::Click);
                events
            }
            _ => Vec::new(),
        }
    }

    /// Start/pause button semantics.
    pub fn toggle(&mut self) -> Vec<Event> {
        if self.is_running() {
            self.pause()
        } else {
            self.start()
        }
    }

    /// Back to `Configuring` with the same duration and no sets done.
    pub fn reset(&mut self) -> Vec<Event> {
        let events = self.cancel_rest();
        self.state = CountdownState::Configuring;
        self.remaining_ms = self.configured_ms;
        self.completed_sets = 0;
        debug!(configured_ms = self.configured_ms, "countdown reset");
        events
    }

    /// Change the number of sets, clamped to `[1, 99]` and never below the
    /// sets already completed plus the one in progress.
    ///
    /// Takes effect immediately: lowering the target while resting on the
    /// last set finishes the run instead of restarting.
    pub fn set_target_sets(&mut self, n: i64) -> Vec<Event> {
        let in_progress = matches!(
            self.state,
            CountdownState::Running | CountdownState::Paused
        );
        let floor = self.completed_sets + u32::from(in_progress);
        self.target_sets = clamp_sets(n).max(floor);
        if self.state == CountdownState::Resting && self.completed_sets >= self.target_sets {
            let mut events = self.cancel_rest();
            events.extend(self.finish());
            return events;
        }
        Vec::new()
    }

    /// Advance by `delta_ms`. Effective while running or resting.
    ///
    /// Crossing zero fires the completion sequence exactly once, however
    /// large the delta. Time beyond zero, or beyond the end of a rest, is
    /// discarded.
    pub fn tick(&mut self, delta_ms: u64) -> Vec<Event> {
        if delta_ms == 0 {
            return Vec::new();
        }
        match self.state {
            CountdownState::Running => {
                if self.remaining_ms > delta_ms {
                    self.remaining_ms -= delta_ms;
                    Vec::new()
                } else {
                    self.complete_set()
                }
            }
            CountdownState::Resting => {
                let Some(rest) = self.rest.as_mut() else {
                    return Vec::new();
                };
                rest.remaining_ms = rest.remaining_ms.saturating_sub(delta_ms);
                if rest.remaining_ms == 0 {
                    self.rest = None;
                    self.restart()
                } else {
                    Vec::new()
                }
            }
            _ => Vec::new(),
        }
    }

    /// Fire an armed restart from a host-owned one-shot timer.
    ///
    /// A token that is stale, cancelled or already fired does nothing.
    pub fn fire_restart(&mut self, token: RestToken) -> Vec<Event> {
        match self.rest {
            Some(rest) if rest.token == token && self.state == CountdownState::Resting => {
                self.rest = None;
                self.restart()
            }
            _ => {
                debug!(?token, "stale restart token ignored");
                Vec::new()
            }
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn apply_input(&mut self, input: DurationInput) {
        self.input = input;
        self.configured_ms = input.duration_ms();
        self.remaining_ms = self.configured_ms;
        self.completed_sets = 0;
    }

    fn complete_set(&mut self) -> Vec<Event> {
        self.remaining_ms = 0;
        self.completed_sets += 1;
        info!(
            completed = self.completed_sets,
            target = self.target_sets,
            "countdown set complete"
        );

        let mut events = vec![
            Event::Alarm,
            Event::Haptic {
                pattern: HapticPattern::Alarm,
            },
            Event::SetCompleted {
                completed: self.completed_sets,
                target: self.target_sets,
            },
        ];

        if self.completed_sets < self.target_sets {
            self.generation += 1;
            let token = RestToken(self.generation);
            self.rest = Some(PendingRest {
                token,
                remaining_ms: REST_DELAY_MS,
            });
            self.state = CountdownState::Resting;
            events.push(Event::RestStarted {
                token,
                rest_ms: REST_DELAY_MS,
            });
        } else {
            events.extend(self.finish());
        }
        events
    }

    fn finish(&mut self) -> Vec<Event> {
        self.state = CountdownState::Complete;
        self.remaining_ms = 0;
        info!(sets = self.completed_sets, "countdown finished");
        vec![Event::SetsFinished {
            sets: self.completed_sets,
        }]
    }

    fn restart(&mut self) -> Vec<Event> {
        self.remaining_ms = self.configured_ms;
        self.state = CountdownState::Running;
        let set = self.completed_sets + 1;
        debug!(set, "next set started");
        vec![Event::SetRestarted { set }]
    }

    fn cancel_rest(&mut self) -> Vec<Event> {
        match self.rest.take() {
            Some(rest) => {
                debug!(token = ?rest.token, "pending restart cancelled");
                vec![Event::RestCancelled { token: rest.token }]
            }
            None => Vec::new(),
        }
    }
}

impl TickEngine for Countdown {
    fn tick(&mut self, delta_ms: u64) -> Vec<Event> {
        Countdown::tick(self, delta_ms)
    }

    fn wants_tick(&self) -> bool {
        matches!(
            self.state,
            CountdownState::Running | CountdownState::Resting
        )
    }

    fn next_edge_ms(&self) -> Option<u64> {
        match self.state {
            CountdownState::Running => Some(self.remaining_ms),
            CountdownState::Resting => self.rest_remaining_ms(),
            _ => None,
        }
    }
}
