//! Lap and split analytics.
//!
//! Everything here is a pure function over the lap sequence recorded by the
//! stopwatch. Splits are exact integer milliseconds so equal splits compare
//! equal and best/worst ties are well defined.

mod splits;

pub use splits::{lap_rows, splits, LapRow, SplitSummary};
