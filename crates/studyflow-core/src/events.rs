use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::StudySession;
use crate::timer::{TimerPhase, TimerStatus};

/// Every state change in the timer produces an Event.
/// The caller (CLI, GUI shell) reacts to events; the engine itself
/// performs no side effects.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        phase: TimerPhase,
        duration_secs: u32,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
    TimerSkipped {
        from_phase: TimerPhase,
        to_phase: TimerPhase,
        at: DateTime<Utc>,
    },
    /// Phase forced via the phase selector.
    PhaseSelected {
        phase: TimerPhase,
        at: DateTime<Utc>,
    },
    /// Countdown reached zero for the given phase.
    TimerCompleted {
        phase: TimerPhase,
        at: DateTime<Utc>,
    },
    /// A focus phase completed and produced a session record.
    /// The composition root forwards this to the session repository.
    SessionCompleted {
        session: StudySession,
        at: DateTime<Utc>,
    },
    /// Raised after each completed focus phase.
    WalkReminder {
        at: DateTime<Utc>,
    },
    /// Automatic phase advance after a completion or skip.
    PhaseAdvanced {
        phase: TimerPhase,
        duration_secs: u32,
        at: DateTime<Utc>,
    },
    /// Idle-state manual duration adjustment was applied.
    DurationAdjusted {
        phase: TimerPhase,
        total_secs: u32,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: TimerPhase,
        status: TimerStatus,
        remaining_secs: u32,
        total_secs: u32,
        completed_pomodoros: u32,
        progress: f64,
        at: DateTime<Utc>,
    },
}

/// Fire-and-forget notification port. Implementations must not fail;
/// delivery problems are silently dropped.
pub trait Notifier {
    /// Announce that the given phase just completed.
    fn notify(&self, phase: TimerPhase);
    /// Play the completion sound.
    fn play_sound(&self);
}

/// Notifier that does nothing. Useful for tests and headless use.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _phase: TimerPhase) {}
    fn play_sound(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn events_tag_with_variant_name() {
        let event = Event::TimerStarted {
            phase: TimerPhase::Focus,
            duration_secs: 1500,
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "TimerStarted");
        assert_eq!(json["phase"], "focus");
        assert_eq!(json["duration_secs"], 1500);
    }

    #[test]
    fn snapshot_roundtrips_through_json() {
        let event = Event::StateSnapshot {
            phase: TimerPhase::LongBreak,
            status: TimerStatus::Paused,
            remaining_secs: 10,
            total_secs: 900,
            completed_pomodoros: 4,
            progress: 0.5,
            at: Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: Event = serde_json::from_str(&json).unwrap();
        match back {
            Event::StateSnapshot {
                phase,
                status,
                remaining_secs,
                ..
            } => {
                assert_eq!(phase, TimerPhase::LongBreak);
                assert_eq!(status, TimerStatus::Paused);
                assert_eq!(remaining_secs, 10);
            }
            _ => panic!("Expected StateSnapshot"),
        }
    }

    #[test]
    fn null_notifier_is_a_noop() {
        let n = NullNotifier;
        n.notify(TimerPhase::Focus);
        n.play_sound();
    }
}
