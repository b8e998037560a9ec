//! Timer engine implementation.
//!
//! The engine is a phase state machine with no internal thread. The
//! caller owns the 1-second countdown source and invokes `tick()` once
//! per second while the timer is running; every transition away from
//! `Running` is the caller's cue to cancel that source. At most one
//! source may drive a given engine.
//!
//! ## State transitions
//!
//! ```text
//! Idle -> Running -> Paused -> Running -> ... -> Idle (complete)
//! ```
//!
//! Side effects are observable, not internal: completion fans out as
//! events (session record, walk reminder, phase advance) and the
//! composition root decides what to do with them. The engine never
//! touches the session repository or the notifier directly.

use chrono::{DateTime, Duration, Utc};

use super::phase::{TimerConfig, TimerPhase, TimerStatus};
use crate::error::ConfigError;
use crate::events::Event;
use crate::session::{StudySession, FALLBACK_COLOR};

/// Durable store for timer preferences. Injected so the engine can be
/// constructed with a fake store in tests.
pub trait ConfigStore {
    fn load(&self) -> TimerConfig;
    fn save(&self, config: &TimerConfig) -> Result<(), ConfigError>;
}

/// Manual duration adjustment bounds, in minutes.
const MIN_ADJUST_MIN: i64 = 1;
const MAX_ADJUST_MIN: i64 = 120;

/// Core timer engine.
///
/// Mutating operations never fail; invalid inputs are clamped at the
/// boundary. Config-store write failures are swallowed and the
/// in-memory config stays authoritative for the current run.
pub struct TimerEngine {
    config: TimerConfig,
    store: Box<dyn ConfigStore>,
    phase: TimerPhase,
    status: TimerStatus,
    /// Remaining time in seconds for the current phase.
    remaining_secs: u32,
    /// Full duration in seconds of the current phase.
    total_secs: u32,
    completed_pomodoros: u32,
    /// Instant the running focus/break was started from Idle.
    session_started_at: Option<DateTime<Utc>>,
    subject_name: String,
    subject_color: String,
    project: Option<(String, String)>,
}

impl TimerEngine {
    /// Create an engine with config loaded from the given store.
    ///
    /// Starts Idle in the Focus phase.
    pub fn new(store: Box<dyn ConfigStore>) -> Self {
        let config = store.load().normalized();
        let total_secs = config.duration_for(TimerPhase::Focus);
        Self {
            config,
            store,
            phase: TimerPhase::Focus,
            status: TimerStatus::Idle,
            remaining_secs: total_secs,
            total_secs,
            completed_pomodoros: 0,
            session_started_at: None,
            subject_name: "General".to_string(),
            subject_color: FALLBACK_COLOR.to_string(),
            project: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn status(&self) -> TimerStatus {
        self.status
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn total_secs(&self) -> u32 {
        self.total_secs
    }

    pub fn completed_pomodoros(&self) -> u32 {
        self.completed_pomodoros
    }

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    pub fn subject(&self) -> (&str, &str) {
        (&self.subject_name, &self.subject_color)
    }

    pub fn project(&self) -> Option<(&str, &str)> {
        self.project
            .as_ref()
            .map(|(n, c)| (n.as_str(), c.as_str()))
    }

    /// 0.0 .. 1.0 progress within the current phase.
    pub fn progress(&self) -> f64 {
        if self.total_secs == 0 {
            return 0.0;
        }
        1.0 - (self.remaining_secs as f64 / self.total_secs as f64)
    }

    /// "MM:SS" rendering of the remaining time.
    pub fn time_string(&self) -> String {
        format!(
            "{:02}:{:02}",
            self.remaining_secs / 60,
            self.remaining_secs % 60
        )
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            phase: self.phase,
            status: self.status,
            remaining_secs: self.remaining_secs,
            total_secs: self.total_secs,
            completed_pomodoros: self.completed_pomodoros,
            progress: self.progress(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Idle -> Running (records the session start) or Paused -> Running
    /// (keeps the earlier start). No-op while already Running.
    pub fn start(&mut self) -> Option<Event> {
        match self.status {
            TimerStatus::Idle => {
                self.session_started_at = Some(Utc::now());
                self.status = TimerStatus::Running;
            }
            TimerStatus::Paused => {
                self.status = TimerStatus::Running;
            }
            TimerStatus::Running => return None,
        }
        Some(Event::TimerStarted {
            phase: self.phase,
            duration_secs: self.total_secs,
            at: Utc::now(),
        })
    }

    /// Running -> Paused; remaining time is retained exactly.
    pub fn pause(&mut self) -> Option<Event> {
        if self.status != TimerStatus::Running {
            return None;
        }
        self.status = TimerStatus::Paused;
        Some(Event::TimerPaused {
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Any state -> Idle with the configured duration for the current phase.
    pub fn reset(&mut self) -> Option<Event> {
        self.status = TimerStatus::Idle;
        self.session_started_at = None;
        self.total_secs = self.config.duration_for(self.phase);
        self.remaining_secs = self.total_secs;
        Some(Event::TimerReset { at: Utc::now() })
    }

    /// Advance to the next phase without emitting a session record.
    pub fn skip(&mut self) -> Option<Event> {
        let from = self.phase;
        let next = self.next_phase();
        self.apply_phase(next);
        Some(Event::TimerSkipped {
            from_phase: from,
            to_phase: next,
            at: Utc::now(),
        })
    }

    /// Force the current phase, resetting to Idle with that phase's
    /// configured duration.
    pub fn set_phase(&mut self, phase: TimerPhase) -> Option<Event> {
        self.apply_phase(phase);
        Some(Event::PhaseSelected {
            phase,
            at: Utc::now(),
        })
    }

    /// Call once per second while Running. Idle and Paused ticks have
    /// no effect. Completion fans out into several events.
    pub fn tick(&mut self) -> Vec<Event> {
        if self.status != TimerStatus::Running || self.remaining_secs == 0 {
            return Vec::new();
        }
        self.remaining_secs -= 1;
        if self.remaining_secs == 0 {
            self.complete()
        } else {
            Vec::new()
        }
    }

    /// Select the tag recorded on completed sessions.
    pub fn select_subject(&mut self, name: impl Into<String>, color: impl Into<String>) {
        self.subject_name = name.into();
        self.subject_color = color.into();
    }

    /// Select (or clear) the project recorded on completed sessions.
    pub fn select_project(&mut self, project: Option<(String, String)>) {
        self.project = project;
    }

    /// Manual ±5-minute duration adjustment, only permitted while Idle.
    ///
    /// The current remaining time is snapped to a 5-minute boundary
    /// (up on increase, down on decrease; exact multiples step a full
    /// 5 minutes down), clamped to 1..=120 minutes, and written back
    /// into the config field for the current phase.
    pub fn adjust_duration(&mut self, by_min: i64) -> Option<Event> {
        if self.status != TimerStatus::Idle || by_min == 0 {
            return None;
        }
        let current_min = (self.remaining_secs / 60) as i64;
        let snapped = if by_min > 0 {
            (current_min / 5 + 1) * 5
        } else if current_min % 5 == 0 {
            current_min - 5
        } else {
            (current_min / 5) * 5
        };
        let clamped = snapped.clamp(MIN_ADJUST_MIN, MAX_ADJUST_MIN) as u32 * 60;
        self.remaining_secs = clamped;
        self.total_secs = clamped;
        self.config.set_duration_for(self.phase, clamped);
        // Best-effort persistence; in-memory config stays authoritative.
        let _ = self.store.save(&self.config);
        Some(Event::DurationAdjusted {
            phase: self.phase,
            total_secs: clamped,
            at: Utc::now(),
        })
    }

    /// Replace the config and persist it. An Idle timer immediately
    /// re-derives its duration from the new config; a Running or
    /// Paused countdown is left undisturbed.
    pub fn update_config(&mut self, config: TimerConfig) {
        self.config = config.normalized();
        let _ = self.store.save(&self.config);
        if self.status == TimerStatus::Idle {
            self.total_secs = self.config.duration_for(self.phase);
            self.remaining_secs = self.total_secs;
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Countdown reached zero. Stops the timer, emits the session for
    /// focus phases, and advances to the next phase.
    fn complete(&mut self) -> Vec<Event> {
        let at = Utc::now();
        let finished = self.phase;
        self.status = TimerStatus::Idle;

        let mut events = vec![Event::TimerCompleted {
            phase: finished,
            at,
        }];

        if finished == TimerPhase::Focus {
            self.completed_pomodoros += 1;
            // Tolerate a missing start instant by synthesizing one.
            let started_at = self
                .session_started_at
                .unwrap_or_else(|| at - Duration::seconds(self.total_secs as i64));
            let session = StudySession::new(
                self.subject_name.clone(),
                self.subject_color.clone(),
                self.total_secs,
                started_at,
                at,
                1,
                self.project.as_ref().map(|(n, _)| n.clone()),
                self.project.as_ref().map(|(_, c)| c.clone()),
            );
            events.push(Event::SessionCompleted { session, at });
            events.push(Event::WalkReminder { at });
        }

        let next = self.next_phase();
        self.apply_phase(next);
        events.push(Event::PhaseAdvanced {
            phase: next,
            duration_secs: self.total_secs,
            at,
        });
        events
    }

    /// Long break every `long_break_interval` completed pomodoros;
    /// breaks always return to focus.
    fn next_phase(&self) -> TimerPhase {
        match self.phase {
            TimerPhase::Focus => {
                if self.completed_pomodoros > 0
                    && self.completed_pomodoros % self.config.long_break_interval == 0
                {
                    TimerPhase::LongBreak
                } else {
                    TimerPhase::ShortBreak
                }
            }
            TimerPhase::ShortBreak | TimerPhase::LongBreak => TimerPhase::Focus,
        }
    }

    fn apply_phase(&mut self, phase: TimerPhase) {
        self.phase = phase;
        self.status = TimerStatus::Idle;
        self.session_started_at = None;
        self.total_secs = self.config.duration_for(phase);
        self.remaining_secs = self.total_secs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryConfigStore;
    use proptest::prelude::*;

    fn engine_with(config: TimerConfig) -> (TimerEngine, MemoryConfigStore) {
        let store = MemoryConfigStore::new(config);
        let engine = TimerEngine::new(Box::new(store.clone()));
        (engine, store)
    }

    fn engine() -> TimerEngine {
        engine_with(TimerConfig::default()).0
    }

    /// Run the engine until the current phase completes.
    fn run_to_completion(engine: &mut TimerEngine) -> Vec<Event> {
        engine.start();
        loop {
            let events = engine.tick();
            if !events.is_empty() {
                return events;
            }
        }
    }

    fn short_config() -> TimerConfig {
        TimerConfig {
            focus_secs: 2,
            short_break_secs: 1,
            long_break_secs: 1,
            ..TimerConfig::default()
        }
    }

    #[test]
    fn start_pause_start() {
        let mut engine = engine();
        assert_eq!(engine.status(), TimerStatus::Idle);

        assert!(engine.start().is_some());
        assert_eq!(engine.status(), TimerStatus::Running);
        assert!(engine.start().is_none());

        assert!(engine.pause().is_some());
        assert_eq!(engine.status(), TimerStatus::Paused);

        assert!(engine.start().is_some());
        assert_eq!(engine.status(), TimerStatus::Running);
    }

    #[test]
    fn tick_is_frozen_while_idle_and_paused() {
        let mut engine = engine();
        let before = engine.remaining_secs();
        assert!(engine.tick().is_empty());
        assert_eq!(engine.remaining_secs(), before);

        engine.start();
        engine.tick();
        engine.pause();
        let paused_at = engine.remaining_secs();
        assert!(engine.tick().is_empty());
        assert_eq!(engine.remaining_secs(), paused_at);
        assert_eq!(paused_at, before - 1);
    }

    #[test]
    fn reset_restores_configured_duration() {
        let mut engine = engine();
        engine.start();
        engine.tick();
        engine.tick();
        engine.reset();
        assert_eq!(engine.status(), TimerStatus::Idle);
        assert_eq!(engine.remaining_secs(), engine.total_secs());
        assert_eq!(
            engine.total_secs(),
            engine.config().duration_for(TimerPhase::Focus)
        );
    }

    #[test]
    fn focus_completion_emits_session_and_walk_reminder() {
        let (mut engine, _) = engine_with(short_config());
        engine.select_subject("Math", "#339AF0");
        let events = run_to_completion(&mut engine);

        assert!(matches!(
            events[0],
            Event::TimerCompleted {
                phase: TimerPhase::Focus,
                ..
            }
        ));
        let session = events
            .iter()
            .find_map(|e| match e {
                Event::SessionCompleted { session, .. } => Some(session),
                _ => None,
            })
            .expect("focus completion must emit a session");
        assert_eq!(session.subject_name, "Math");
        assert_eq!(session.duration_secs, 2);
        assert_eq!(session.pomodoro_count, 1);
        assert!(session.ended_at >= session.started_at);
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::WalkReminder { .. })));
        assert_eq!(engine.completed_pomodoros(), 1);
        assert_eq!(engine.phase(), TimerPhase::ShortBreak);
        assert_eq!(engine.status(), TimerStatus::Idle);
    }

    #[test]
    fn break_completion_emits_no_session() {
        let (mut engine, _) = engine_with(short_config());
        engine.set_phase(TimerPhase::ShortBreak);
        let events = run_to_completion(&mut engine);
        assert!(!events
            .iter()
            .any(|e| matches!(e, Event::SessionCompleted { .. })));
        assert_eq!(engine.phase(), TimerPhase::Focus);
        assert_eq!(engine.completed_pomodoros(), 0);
    }

    #[test]
    fn long_break_after_interval_pomodoros() {
        let (mut engine, _) = engine_with(short_config());
        for n in 1..=8u32 {
            // Focus phase.
            assert_eq!(engine.phase(), TimerPhase::Focus);
            run_to_completion(&mut engine);
            assert_eq!(engine.completed_pomodoros(), n);
            let expected = if n % 4 == 0 {
                TimerPhase::LongBreak
            } else {
                TimerPhase::ShortBreak
            };
            assert_eq!(engine.phase(), expected, "after pomodoro {n}");
            // Break phase back to focus.
            run_to_completion(&mut engine);
        }
    }

    #[test]
    fn skip_advances_without_session() {
        let mut engine = engine();
        engine.start();
        let event = engine.skip().unwrap();
        assert!(matches!(
            event,
            Event::TimerSkipped {
                from_phase: TimerPhase::Focus,
                to_phase: TimerPhase::ShortBreak,
                ..
            }
        ));
        assert_eq!(engine.status(), TimerStatus::Idle);
        assert_eq!(engine.completed_pomodoros(), 0);
        assert_eq!(
            engine.remaining_secs(),
            engine.config().duration_for(TimerPhase::ShortBreak)
        );
    }

    #[test]
    fn set_phase_resets_to_idle_with_configured_duration() {
        let mut engine = engine();
        engine.start();
        engine.tick();
        engine.set_phase(TimerPhase::LongBreak);
        assert_eq!(engine.phase(), TimerPhase::LongBreak);
        assert_eq!(engine.status(), TimerStatus::Idle);
        assert_eq!(engine.remaining_secs(), 15 * 60);
    }

    #[test]
    fn adjust_snaps_up_from_off_boundary() {
        let (mut engine, _) = engine_with(TimerConfig {
            focus_secs: 27 * 60,
            ..TimerConfig::default()
        });
        engine.adjust_duration(5);
        assert_eq!(engine.remaining_secs(), 30 * 60);
        assert_eq!(engine.config().focus_secs, 30 * 60);
    }

    #[test]
    fn adjust_steps_down_from_exact_multiple() {
        let mut engine = engine();
        engine.adjust_duration(5); // 25 -> 30
        assert_eq!(engine.remaining_secs(), 30 * 60);
        engine.adjust_duration(-5); // 30 -> 25
        assert_eq!(engine.remaining_secs(), 25 * 60);
    }

    #[test]
    fn adjust_snaps_down_from_off_boundary() {
        let (mut engine, _) = engine_with(TimerConfig {
            focus_secs: 27 * 60,
            ..TimerConfig::default()
        });
        engine.adjust_duration(-5);
        assert_eq!(engine.remaining_secs(), 25 * 60);
    }

    #[test]
    fn adjust_clamps_at_bounds() {
        let (mut engine, _) = engine_with(TimerConfig {
            focus_secs: 3 * 60,
            ..TimerConfig::default()
        });
        engine.adjust_duration(-5);
        assert_eq!(engine.remaining_secs(), 60);
        engine.adjust_duration(-5);
        assert_eq!(engine.remaining_secs(), 60);

        let (mut engine, _) = engine_with(TimerConfig {
            focus_secs: 118 * 60,
            ..TimerConfig::default()
        });
        engine.adjust_duration(5);
        assert_eq!(engine.remaining_secs(), 120 * 60);
        engine.adjust_duration(5);
        assert_eq!(engine.remaining_secs(), 120 * 60);
    }

    #[test]
    fn adjust_is_rejected_while_running() {
        let mut engine = engine();
        engine.start();
        assert!(engine.adjust_duration(5).is_none());
    }

    #[test]
    fn adjust_persists_config() {
        let (mut engine, store) = engine_with(TimerConfig {
            focus_secs: 27 * 60,
            ..TimerConfig::default()
        });
        engine.adjust_duration(5);
        assert_eq!(store.saved().focus_secs, 30 * 60);
    }

    #[test]
    fn update_config_persists_and_rederives_idle_duration() {
        let (mut engine, store) = engine_with(TimerConfig::default());
        let cfg = TimerConfig {
            focus_secs: 50 * 60,
            ..TimerConfig::default()
        };
        engine.update_config(cfg.clone());
        assert_eq!(store.saved(), cfg);
        assert_eq!(engine.remaining_secs(), 50 * 60);
        assert_eq!(engine.total_secs(), 50 * 60);
    }

    #[test]
    fn update_config_leaves_running_countdown_alone() {
        let (mut engine, _) = engine_with(TimerConfig::default());
        engine.start();
        engine.tick();
        let remaining = engine.remaining_secs();
        engine.update_config(TimerConfig {
            focus_secs: 50 * 60,
            ..TimerConfig::default()
        });
        assert_eq!(engine.remaining_secs(), remaining);
        assert_eq!(engine.status(), TimerStatus::Running);
    }

    #[test]
    fn time_string_renders_mm_ss() {
        let (engine, _) = engine_with(TimerConfig {
            focus_secs: 25 * 60,
            ..TimerConfig::default()
        });
        assert_eq!(engine.time_string(), "25:00");
    }

    #[test]
    fn session_carries_selected_project() {
        let (mut engine, _) = engine_with(short_config());
        engine.select_project(Some(("Thesis".to_string(), "#339AF0".to_string())));
        let events = run_to_completion(&mut engine);
        let session = events
            .iter()
            .find_map(|e| match e {
                Event::SessionCompleted { session, .. } => Some(session),
                _ => None,
            })
            .unwrap();
        assert_eq!(session.project_name.as_deref(), Some("Thesis"));
        assert_eq!(session.project_color.as_deref(), Some("#339AF0"));
    }

    proptest! {
        /// After every Nth focus completion the engine rests long iff
        /// N is a multiple of the configured interval.
        #[test]
        fn cadence_holds_for_any_interval(interval in 2u32..=8, rounds in 1usize..=20) {
            let config = TimerConfig {
                focus_secs: 1,
                short_break_secs: 1,
                long_break_secs: 1,
                long_break_interval: interval,
                ..TimerConfig::default()
            };
            let (mut engine, _) = engine_with(config);
            for n in 1..=rounds as u32 {
                run_to_completion(&mut engine);
                let expected = if n % interval == 0 {
                    TimerPhase::LongBreak
                } else {
                    TimerPhase::ShortBreak
                };
                prop_assert_eq!(engine.phase(), expected);
                prop_assert_eq!(engine.completed_pomodoros(), n);
                run_to_completion(&mut engine);
                prop_assert_eq!(engine.phase(), TimerPhase::Focus);
            }
        }
    }
}
