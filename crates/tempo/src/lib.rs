//! tempo - Focus/rest interval timer
//!
//! "One beat at a time."
//!
//! A pomodoro-style cycle manager:
//! - Focus phases with a 70 bpm metronome click
//! - Short breaks, and a long break after every fourth session
//! - A session goal that stops the cycle and shows a summary
//! - Settings editable mid-session without disturbing the running countdown
//!
//! The [`Engine`] owns all state. Front ends issue commands and read
//! [`Snapshot`]s; timers come from a [`Scheduler`] and sounds go through
//! [`Sounds`], so the whole cycle can be driven synchronously in tests.

pub mod engine;
pub mod keys;
pub mod scheduler;
pub mod session;
pub mod sound;
pub mod ui;

pub use engine::Engine;
pub use scheduler::{ManualScheduler, Scheduler, TimerHandle, TokioScheduler};
pub use session::{Phase, Session, Snapshot, Transition};
pub use sound::{Player, RecordingSounds, Silent, Sounds};
pub use tempo_core::format::clock as format_time;
pub use tempo_core::{Config, ConfigUpdate};
