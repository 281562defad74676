use serde::{Deserialize, Serialize};

pub const MAX_MINUTES: u32 = 99;
pub const MAX_SECONDS: u32 = 59;
pub const MIN_SETS: u32 = 1;
pub const MAX_SETS: u32 = 99;

/// A countdown duration already clamped to the editable range
/// `[0, 99]` minutes and `[0, 59]` seconds.
///
/// Raw user input goes through the constructors, so the engine never sees an
/// out-of-range value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationInput {
    minutes: u32,
    seconds: u32,
}

impl DurationInput {
    /// Clamp raw minutes and seconds independently.
    pub fn clamped(minutes: i64, seconds: i64) -> Self {
        Self {
            minutes: minutes.clamp(0, i64::from(MAX_MINUTES)) as u32,
            seconds: seconds.clamp(0, i64::from(MAX_SECONDS)) as u32,
        }
    }

    /// Split a total in seconds, saturating at 99:59.
    pub fn from_total_secs(total_secs: u64) -> Self {
        let max = u64::from(MAX_MINUTES) * 60 + u64::from(MAX_SECONDS);
        let total = total_secs.min(max);
        Self {
            minutes: (total / 60) as u32,
            seconds: (total % 60) as u32,
        }
    }

    pub fn minutes(self) -> u32 {
        self.minutes
    }

    pub fn seconds(self) -> u32 {
        self.seconds
    }

    pub fn duration_ms(self) -> u64 {
        (u64::from(self.minutes) * 60 + u64::from(self.seconds)) * 1000
    }
}

/// Clamp a raw set count to `[1, 99]`.
pub fn clamp_sets(n: i64) -> u32 {
    n.clamp(i64::from(MIN_SETS), i64::from(MAX_SETS)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_each_field() {
        let d = DurationInput::clamped(-3, 75);
        assert_eq!((d.minutes(), d.seconds()), (0, 59));
        let d = DurationInput::clamped(250, -1);
        assert_eq!((d.minutes(), d.seconds()), (99, 0));
    }

    #[test]
    fn duration_in_ms() {
        assert_eq!(DurationInput::clamped(0, 30).duration_ms(), 30_000);
        assert_eq!(DurationInput::clamped(5, 0).duration_ms(), 300_000);
    }

    #[test]
    fn from_total_secs_splits_and_saturates() {
        let d = DurationInput::from_total_secs(900);
        assert_eq!((d.minutes(), d.seconds()), (15, 0));
        let d = DurationInput::from_total_secs(90);
        assert_eq!((d.minutes(), d.seconds()), (1, 30));
        let d = DurationInput::from_total_secs(1_000_000);
        assert_eq!((d.minutes(), d.seconds()), (99, 59));
    }

    #[test]
    fn sets_clamp() {
        assert_eq!(clamp_sets(0), 1);
        assert_eq!(clamp_sets(-5), 1);
        assert_eq!(clamp_sets(12), 12);
        assert_eq!(clamp_sets(500), 99);
    }
}
