//! Routing engine events to their consumers.
//!
//! Engines only emit events. Feedback (click, haptic, alarm) goes to a
//! [`NotificationSink`] after the user's sound/vibration toggles are applied;
//! `CommitHistory` goes to the [`HistoryLog`]. Sinks are fire-and-forget: the
//! engine transition has already happened by the time they run, and a sink
//! that cannot render anything is not an error.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::events::Event;
use crate::storage::HistoryLog;

/// Renders feedback events as audio or vibration.
pub trait NotificationSink {
    fn notify(&mut self, event: &Event);
}

/// A sink that discards everything, for hosts without audio or vibration.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn notify(&mut self, _event: &Event) {}
}

/// A sink that keeps every event it receives.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub events: Vec<Event>,
}

impl NotificationSink for RecordingSink {
    fn notify(&mut self, event: &Event) {
        self.events.push(event.clone());
    }
}

/// User toggles applied before feedback reaches the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackSettings {
    pub sound: bool,
    pub vibration: bool,
}

impl Default for FeedbackSettings {
    fn default() -> Self {
        Self {
            sound: true,
            vibration: true,
        }
    }
}

impl FeedbackSettings {
    /// Whether `event` should be rendered. Non-feedback events always pass.
    pub fn allows(&self, event: &Event) -> bool {
        match event {
            Event::Click | Event::Alarm => self.sound,
            Event::Haptic { .. } => self.vibration,
            _ => true,
        }
    }
}

/// Deliver `events` in order.
///
/// Feedback allowed by `settings` goes to `sink`, history commits go to
/// `history`, and lifecycle events are only logged.
///
/// # Errors
/// Returns an error if the history log fails to store a record. Events
/// before the failing one have already been delivered.
pub fn dispatch<I>(
    events: I,
    settings: FeedbackSettings,
    sink: &mut dyn NotificationSink,
    history: &mut dyn HistoryLog,
) -> Result<()>
where
    I: IntoIterator<Item = Event>,
{
    for event in events {
        match event {
            Event::CommitHistory { record } => history.commit(record)?,
            ref feedback if feedback.is_feedback() => {
                if settings.allows(feedback) {
                    sink.notify(feedback);
                }
            }
            other => debug!(event = ?other, "engine event"),
        }
    }
    Ok(())
}
