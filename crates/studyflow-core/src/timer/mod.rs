mod engine;
mod phase;

pub use engine::{ConfigStore, TimerEngine};
pub use phase::{TimerConfig, TimerPhase, TimerStatus};
