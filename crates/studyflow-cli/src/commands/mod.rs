pub mod config;
pub mod project;
pub mod session;
pub mod stats;
pub mod tag;
pub mod timer;
