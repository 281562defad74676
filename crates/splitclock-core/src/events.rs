use serde::{Deserialize, Serialize};

use crate::storage::WorkoutRecord;

/// Vibration pattern requested by a [`Event::Haptic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HapticPattern {
    /// Single short pulse, used for lap capture.
    Short,
    /// Pulse train played when a countdown set reaches zero.
    Alarm,
}

impl HapticPattern {
    /// Alternating on/off durations in milliseconds, starting with "on".
    pub fn durations_ms(self) -> &'static [u32] {
        match self {
            HapticPattern::Short => &[50],
            HapticPattern::Alarm => &[200, 100, 200, 100, 200],
        }
    }
}

/// Opaque generation number identifying one scheduled rest-to-restart.
///
/// Any transition that resets the countdown bumps the generation, so a token
/// handed out earlier no longer matches and its restart is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RestToken(pub u64);

/// Every observable effect of an engine transition.
///
/// Engines return these in emission order; the host forwards feedback
/// events to a notification sink and history events to the history log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Short audible click (start/stop, lap, preset).
    Click,
    /// Vibration request.
    Haptic { pattern: HapticPattern },
    /// Countdown reached zero.
    Alarm,
    /// A countdown set finished.
    SetCompleted { completed: u32, target: u32 },
    /// Auto-restart armed; fires after `rest_ms` unless cancelled.
    RestStarted { token: RestToken, rest_ms: u64 },
    /// A new set began after the rest.
    SetRestarted { set: u32 },
    /// All target sets are done; no further auto action.
    SetsFinished { sets: u32 },
    /// A pending restart was invalidated before it fired.
    RestCancelled { token: RestToken },
    /// A finished stopwatch session to append to history.
    CommitHistory { record: WorkoutRecord },
}

impl Event {
    /// Whether this event is meant for the notification sink.
    pub fn is_feedback(&self) -> bool {
        matches!(self, Event::Click | Event::Haptic { .. } | Event::Alarm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn haptic_patterns() {
        assert_eq!(HapticPattern::Short.durations_ms(), &[50]);
        assert_eq!(HapticPattern::Alarm.durations_ms().len(), 5);
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let json = serde_json::to_value(Event::Haptic {
            pattern: HapticPattern::Short,
        })
        .unwrap();
        assert_eq!(json["type"], "haptic");
        assert_eq!(json["pattern"], "short");

        let json = serde_json::to_value(Event::RestStarted {
            token: RestToken(3),
            rest_ms: 2000,
        })
        .unwrap();
        assert_eq!(json["type"], "rest_started");
        assert_eq!(json["token"], 3);
    }

    #[test]
    fn feedback_classification() {
        assert!(Event::Click.is_feedback());
        assert!(Event::Alarm.is_feedback());
        assert!(!Event::SetsFinished { sets: 1 }.is_feedback());
    }
}
