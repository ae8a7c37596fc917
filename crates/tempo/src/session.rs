//! Session state machine
//!
//! The machine knows nothing about clocks. It is advanced one second at a
//! time by [`Session::tick`] and changes phase only through
//! [`Session::complete_phase`], the single place where sessions are counted.

use serde::{Deserialize, Serialize};
use tempo_core::{Config, ConfigUpdate};
use tracing::{debug, info};

use crate::sound::Sounds;

/// Every n-th completed focus session earns a long break
pub const LONG_BREAK_EVERY: u32 = 4;

/// The current countdown mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Focus,
    ShortBreak,
    LongBreak,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Focus => "focus",
            Phase::ShortBreak => "short_break",
            Phase::LongBreak => "long_break",
        }
    }

    /// Human label shown next to the clock
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Focus => "Focus Time",
            Phase::ShortBreak => "Short Break",
            Phase::LongBreak => "Long Break",
        }
    }

    /// Short or long break
    pub fn is_break(&self) -> bool {
        !matches!(self, Phase::Focus)
    }

    /// Length of this phase under the given configuration
    pub fn duration_secs(&self, config: &Config) -> i64 {
        match self {
            Phase::Focus => config.focus_secs(),
            Phase::ShortBreak => config.rest_secs(),
            Phase::LongBreak => config.long_break_secs(),
        }
    }

    /// The break that follows the `completed`-th focus session
    pub fn break_after(completed: u32) -> Self {
        if completed != 0 && completed % LONG_BREAK_EVERY == 0 {
            Phase::LongBreak
        } else {
            Phase::ShortBreak
        }
    }
}

/// Read-only view of the session, handed to front ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub phase: Phase,
    pub seconds_remaining: i64,
    pub sessions_completed: u32,
    pub running: bool,
    pub goal_reached: bool,
}

impl Snapshot {
    pub fn phase_label(&self) -> &'static str {
        self.phase.label()
    }

    /// Countdown as `MM:SS`
    pub fn clock(&self) -> String {
        tempo_core::format::clock(self.seconds_remaining)
    }
}

/// What a phase completion did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: Phase,
    pub to: Phase,
    pub sessions_completed: u32,
    /// The goal was reached by this transition and the timer stopped
    pub goal_reached: bool,
}

/// Session state plus the configuration it is measured against
#[derive(Debug, Clone)]
pub struct Session {
    config: Config,
    phase: Phase,
    seconds_remaining: i64,
    sessions_completed: u32,
    running: bool,
    goal_reached: bool,
}

impl Session {
    /// Fresh session: stopped, at the start of a focus phase
    pub fn new(config: Config) -> Self {
        let seconds_remaining = config.focus_secs();
        Self {
            config,
            phase: Phase::Focus,
            seconds_remaining,
            sessions_completed: 0,
            running: false,
            goal_reached: false,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn goal_reached(&self) -> bool {
        self.goal_reached
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            seconds_remaining: self.seconds_remaining,
            sessions_completed: self.sessions_completed,
            running: self.running,
            goal_reached: self.goal_reached,
        }
    }

    /// Start the countdown. Returns whether anything changed.
    ///
    /// Refused once the goal is reached; only [`Session::reset`] clears that.
    pub fn start(&mut self) -> bool {
        if self.running || self.goal_reached {
            return false;
        }
        self.running = true;
        true
    }

    /// Pause the countdown. Returns whether anything changed.
    pub fn pause(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        true
    }

    /// Start if paused, pause if running
    pub fn toggle_running(&mut self) -> bool {
        if self.running {
            self.pause()
        } else {
            self.start()
        }
    }

    /// One second passes. Ignored while paused.
    pub fn tick(&mut self, sounds: &dyn Sounds) -> Option<Transition> {
        if !self.running {
            return None;
        }
        self.seconds_remaining -= 1;
        if self.seconds_remaining <= 0 {
            return Some(self.complete_phase(sounds));
        }
        None
    }

    /// End the current phase now, exactly as if it had run out.
    ///
    /// Does nothing while the goal summary is showing.
    pub fn skip(&mut self, sounds: &dyn Sounds) -> Option<Transition> {
        if self.goal_reached {
            return None;
        }
        self.seconds_remaining = 0;
        Some(self.complete_phase(sounds))
    }

    /// Back to a fresh focus phase using the current focus duration
    pub fn reset(&mut self) {
        self.running = false;
        self.phase = Phase::Focus;
        self.sessions_completed = 0;
        self.seconds_remaining = self.config.focus_secs();
        self.goal_reached = false;
    }

    /// Replace settings. The running countdown is not touched; new
    /// durations apply the next time their phase is entered.
    ///
    /// A new goal is checked at once, so lowering it to the sessions
    /// already done stops the timer and shows the summary.
    pub fn update_config(&mut self, update: &ConfigUpdate) {
        self.config.apply(update);
        if update.goal_sessions.is_some() {
            self.check_goal();
        }
    }

    /// Stop for good once the goal is met. Raising the goal afterwards
    /// does not clear it; only a reset does.
    fn check_goal(&mut self) -> bool {
        if self.goal_reached {
            return false;
        }
        if self.config.goal_enabled() && self.sessions_completed >= self.config.goal_sessions {
            self.goal_reached = true;
            self.running = false;
            info!(sessions = self.sessions_completed, "Goal reached");
            return true;
        }
        false
    }

    /// The only path that changes phase or counts a session.
    ///
    /// Leaving focus: count the session, enter the break with its full
    /// duration, play the notification, then check the goal. Reaching the
    /// goal stops the timer before the break counts down. Leaving a break
    /// just starts the next focus, silently.
    fn complete_phase(&mut self, sounds: &dyn Sounds) -> Transition {
        let from = self.phase;
        let mut reached = false;

        if from == Phase::Focus {
            self.sessions_completed += 1;
            self.phase = Phase::break_after(self.sessions_completed);
            self.seconds_remaining = self.phase.duration_secs(&self.config);
            sounds.notification();
            reached = self.check_goal();
        } else {
            self.phase = Phase::Focus;
            self.seconds_remaining = self.config.focus_secs();
        }

        debug!(
            from = from.as_str(),
            to = self.phase.as_str(),
            seconds = self.seconds_remaining,
            "Phase complete"
        );

        Transition {
            from,
            to: self.phase,
            sessions_completed: self.sessions_completed,
            goal_reached: reached,
        }
    }
}
