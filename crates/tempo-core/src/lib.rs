//! Tempo Core - Shared functionality for the tempo interval timer
//!
//! Holds what the timer and its front ends agree on: where files live,
//! what the configuration looks like, and how durations are printed.

pub mod config;
pub mod format;
pub mod paths;

pub use config::{Config, ConfigError, ConfigUpdate, SoundFiles};
pub use paths::Paths;
