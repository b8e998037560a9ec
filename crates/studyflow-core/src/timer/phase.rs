use serde::{Deserialize, Serialize};

/// Current countdown mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerPhase {
    Focus,
    ShortBreak,
    LongBreak,
}

impl TimerPhase {
    pub const ALL: [TimerPhase; 3] = [
        TimerPhase::Focus,
        TimerPhase::ShortBreak,
        TimerPhase::LongBreak,
    ];

    /// Built-in duration used before any configuration exists.
    pub fn default_duration_secs(self) -> u32 {
        match self {
            TimerPhase::Focus => 25 * 60,
            TimerPhase::ShortBreak => 5 * 60,
            TimerPhase::LongBreak => 15 * 60,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimerPhase::Focus => "Focus",
            TimerPhase::ShortBreak => "Short Break",
            TimerPhase::LongBreak => "Long Break",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            TimerPhase::Focus => "\u{1F3AF}",
            TimerPhase::ShortBreak => "\u{2615}",
            TimerPhase::LongBreak => "\u{1F33F}",
        }
    }
}

/// Run state of the countdown, orthogonal to the phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Idle,
    Running,
    Paused,
}

/// Durable timer preferences.
///
/// Loaded once at engine construction and persisted on every mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Focus phase duration in seconds.
    #[serde(default = "default_focus_secs")]
    pub focus_secs: u32,
    /// Short break duration in seconds.
    #[serde(default = "default_short_break_secs")]
    pub short_break_secs: u32,
    /// Long break duration in seconds.
    #[serde(default = "default_long_break_secs")]
    pub long_break_secs: u32,
    /// Completed pomodoros between long breaks.
    #[serde(default = "default_long_break_interval")]
    pub long_break_interval: u32,
    #[serde(default = "default_true")]
    pub sound_enabled: bool,
    #[serde(default = "default_true")]
    pub notifications_enabled: bool,
}

fn default_focus_secs() -> u32 {
    25 * 60
}
fn default_short_break_secs() -> u32 {
    5 * 60
}
fn default_long_break_secs() -> u32 {
    15 * 60
}
fn default_long_break_interval() -> u32 {
    4
}
fn default_true() -> bool {
    true
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            focus_secs: default_focus_secs(),
            short_break_secs: default_short_break_secs(),
            long_break_secs: default_long_break_secs(),
            long_break_interval: default_long_break_interval(),
            sound_enabled: true,
            notifications_enabled: true,
        }
    }
}

impl TimerConfig {
    /// Configured duration for a phase, in seconds.
    pub fn duration_for(&self, phase: TimerPhase) -> u32 {
        match phase {
            TimerPhase::Focus => self.focus_secs,
            TimerPhase::ShortBreak => self.short_break_secs,
            TimerPhase::LongBreak => self.long_break_secs,
        }
    }

    /// Write back the duration for a phase, in seconds.
    pub fn set_duration_for(&mut self, phase: TimerPhase, secs: u32) {
        match phase {
            TimerPhase::Focus => self.focus_secs = secs,
            TimerPhase::ShortBreak => self.short_break_secs = secs,
            TimerPhase::LongBreak => self.long_break_secs = secs,
        }
    }

    /// Clamp every field into its valid range. Durations must be
    /// positive and the long-break interval at least 2.
    pub fn normalized(mut self) -> Self {
        self.focus_secs = self.focus_secs.max(1);
        self.short_break_secs = self.short_break_secs.max(1);
        self.long_break_secs = self.long_break_secs.max(1);
        self.long_break_interval = self.long_break_interval.max(2);
        self
    }
}
