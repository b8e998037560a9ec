//! # StudyFlow Core Library
//!
//! Core business logic for StudyFlow, a personal study-time tracker:
//! a Pomodoro-style interval timer plus historical analytics over
//! recorded sessions. The CLI binary is a thin layer over this crate;
//! any other front end can be too.
//!
//! ## Architecture
//!
//! - **Timer Engine**: a caller-ticked phase state machine that emits
//!   events instead of performing side effects
//! - **Analytics**: pure recomputation of derived statistics from the
//!   full session collection
//! - **Storage**: SQLite-based session/tag/project repository and
//!   TOML-based configuration
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: the phase state machine
//! - [`DerivedStats`]: today/week/streak/breakdown analytics
//! - [`Database`]: session, tag, and project persistence
//! - [`Config`]: application configuration management

pub mod error;
pub mod events;
pub mod session;
pub mod stats;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, DatabaseError};
pub use events::{Event, Notifier, NullNotifier};
pub use session::{Project, StudySession, Tag};
pub use stats::{DayTotal, DerivedStats, TagSlice};
pub use storage::{Config, Database, MemoryConfigStore, TomlConfigStore};
pub use timer::{ConfigStore, TimerConfig, TimerEngine, TimerPhase, TimerStatus};
