use serde::{Deserialize, Serialize};

/// Derive splits from absolute lap timestamps.
///
/// `splits[i] = laps[i] - laps[i - 1]`, with an implicit lap at 0 before the
/// first one.
pub fn splits(laps: &[u64]) -> Vec<u64> {
    let mut prev = 0;
    laps.iter()
        .map(|&lap| {
            let split = lap.saturating_sub(prev);
            prev = lap;
            split
        })
        .collect()
}

/// Best, worst and average split of a non-empty split sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitSummary {
    pub best_ms: u64,
    pub worst_ms: u64,
    /// Integer mean, floored.
    pub average_ms: u64,
    pub count: usize,
}

impl SplitSummary {
    /// Summarize `splits`. Returns `None` when there is no data.
    pub fn from_splits(splits: &[u64]) -> Option<Self> {
        let best_ms = *splits.iter().min()?;
        let worst_ms = *splits.iter().max()?;
        let total: u128 = splits.iter().map(|&s| u128::from(s)).sum();
        let average_ms = (total / splits.len() as u128) as u64;
        Some(Self {
            best_ms,
            worst_ms,
            average_ms,
            count: splits.len(),
        })
    }

    pub fn from_laps(laps: &[u64]) -> Option<Self> {
        Self::from_splits(&splits(laps))
    }
}

/// One row of the lap listing, also the export tuple
/// `(number, total_ms, split_ms)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LapRow {
    /// 1-based lap number.
    pub number: usize,
    pub total_ms: u64,
    pub split_ms: u64,
    /// Every lap whose split equals the best split is marked.
    pub is_best: bool,
    /// Every lap whose split equals the worst split is marked.
    pub is_worst: bool,
}

/// Build the lap listing in recording order.
///
/// With a single lap that lap is both best and worst.
pub fn lap_rows(laps: &[u64]) -> Vec<LapRow> {
    let splits = splits(laps);
    let summary = SplitSummary::from_splits(&splits);
    laps.iter()
        .zip(&splits)
        .enumerate()
        .map(|(i, (&total_ms, &split_ms))| LapRow {
            number: i + 1,
            total_ms,
            split_ms,
            is_best: summary.is_some_and(|s| s.best_ms == split_ms),
            is_worst: summary.is_some_and(|s| s.worst_ms == split_ms),
        })
        .collect()
}
