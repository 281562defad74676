//! Workout history.
//!
//! The stopwatch never reads history while ticking; it only emits
//! `CommitHistory` events. Whatever implements [`HistoryLog`] keeps the
//! newest [`HISTORY_LIMIT`] records, newest first.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{HistoryError, Result, ValidationError};

/// Maximum number of workouts retained.
pub const HISTORY_LIMIT: usize = 10;

/// A finished stopwatch session. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutRecord {
    pub id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub total_time_ms: u64,
    /// Absolute lap timestamps as captured.
    pub laps: Vec<u64>,
}

impl WorkoutRecord {
    pub fn new(recorded_at: DateTime<Utc>, total_time_ms: u64, laps: Vec<u64>) -> Self {
        Self {
            id: Uuid::new_v4(),
            recorded_at,
            total_time_ms,
            laps,
        }
    }

    /// Check the lap invariants of a record read from outside the engine.
    ///
    /// # Errors
    /// Returns an error if laps are not strictly increasing or exceed the
    /// total time.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.laps.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ValidationError::InvalidLaps(
                "laps must be strictly increasing".into(),
            ));
        }
        if self.laps.last().is_some_and(|&last| last > self.total_time_ms) {
            return Err(ValidationError::InvalidLaps(format!(
                "last lap exceeds total time of {} ms",
                self.total_time_ms
            )));
        }
        Ok(())
    }
}

/// Append-only log of finished workouts, capped at [`HISTORY_LIMIT`].
pub trait HistoryLog {
    /// Append a record, evicting the oldest beyond the limit.
    fn commit(&mut self, record: WorkoutRecord) -> Result<()>;

    /// All retained records, newest first.
    fn list(&self) -> Result<Vec<WorkoutRecord>>;

    fn clear(&mut self) -> Result<()>;

    /// Record at `index` in [`HistoryLog::list`] order.
    fn get(&self, index: usize) -> Result<WorkoutRecord> {
        let records = self.list()?;
        let len = records.len();
        records
            .into_iter()
            .nth(index)
            .ok_or_else(|| HistoryError::NotFound { index, len }.into())
    }
}

/// In-memory history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryHistory {
    records: VecDeque<WorkoutRecord>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl HistoryLog for MemoryHistory {
    fn commit(&mut self, record: WorkoutRecord) -> Result<()> {
        self.records.push_front(record);
        self.records.truncate(HISTORY_LIMIT);
        Ok(())
    }

    fn list(&self) -> Result<Vec<WorkoutRecord>> {
        Ok(self.records.iter().cloned().collect())
    }

    fn clear(&mut self) -> Result<()> {
        self.records.clear();
        Ok(())
    }
}
