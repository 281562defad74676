//! # splitclock Core Library
//!
//! Timing engines for an athlete-facing stopwatch and interval countdown.
//! All behavior lives here; the `splitclock` CLI is a thin host over the
//! same library.
//!
//! ## Architecture
//!
//! - **Engines**: [`Stopwatch`] and [`Countdown`] are independent,
//!   serializable state machines. Time only advances through
//!   `tick(delta_ms)`, called by a host loop with the measured interval.
//!   Every operation returns the [`Event`]s it caused, in order.
//! - **Analytics**: splits and best/worst/average summaries over laps
//! - **Notification**: events are routed to a [`NotificationSink`] and a
//!   [`HistoryLog`]; engines never wait on either
//! - **Storage**: SQLite workout history and TOML configuration
//!
//! ## Key Components
//!
//! - [`Stopwatch`]: elapsed time with lap capture
//! - [`Countdown`]: multi-set countdown with cancellable rest restarts
//! - [`Database`]: workout history and host state persistence
//! - [`Config`]: application configuration management

pub mod error;
pub mod events;
pub mod format;
pub mod notify;
pub mod stats;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, DatabaseError, HistoryError, ValidationError};
pub use events::{Event, HapticPattern, RestToken};
pub use notify::{dispatch, FeedbackSettings, NotificationSink, NullSink, RecordingSink};
pub use stats::{LapRow, SplitSummary};
pub use storage::{Config, Database, HistoryLog, MemoryHistory, WorkoutRecord, HISTORY_LIMIT};
pub use timer::{
    Countdown, CountdownState, DurationInput, Stopwatch, StopwatchState, TickEngine,
    REST_DELAY_MS, TICK_PERIOD_MS,
};
