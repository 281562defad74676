mod countdown;
mod input;
mod stopwatch;

pub use countdown::{Countdown, CountdownState, REST_DELAY_MS};
pub use input::{clamp_sets, DurationInput, MAX_MINUTES, MAX_SECONDS, MAX_SETS, MIN_SETS};
pub use stopwatch::{Stopwatch, StopwatchState};

use crate::events::Event;

/// An engine driven by a host-owned periodic tick source.
///
/// `delta_ms` is the measured interval since the previous tick, not the
/// nominal period, so jitter in the host loop does not accumulate as drift.
pub trait TickEngine {
    /// Advance by `delta_ms` and return the events it caused, in order.
    fn tick(&mut self, delta_ms: u64) -> Vec<Event>;

    /// Whether the engine currently has time-dependent work. Hosts may stop
    /// ticking an engine that returns `false`.
    fn wants_tick(&self) -> bool;

    /// Milliseconds until the next point where a tick can raise events or
    /// change state. `None` means ticks are edge-free, so any delta may be
    /// applied in one call.
    fn next_edge_ms(&self) -> Option<u64> {
        None
    }
}

/// Nominal host tick period.
pub const TICK_PERIOD_MS: u64 = 10;
