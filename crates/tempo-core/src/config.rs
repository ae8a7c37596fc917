//! Timer configuration
//!
//! Durations are whole minutes. A goal of 0 means "no goal": the cycle runs
//! indefinitely and never shows the summary.
//!
//! The file is plain JSON and every field is optional:
//!
//! ```json
//! { "focus_minutes": 50, "rest_minutes": 10, "goal_sessions": 4 }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid setting: {0}")]
    Invalid(String),
}

/// Optional sound files for the two cues
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundFiles {
    /// Played on every metronome beat while focusing
    pub click: Option<PathBuf>,
    /// Played when a focus phase ends
    pub notification: Option<PathBuf>,
}

/// Timer configuration, editable at any time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub focus_minutes: u32,
    pub rest_minutes: u32,
    pub long_break_minutes: u32,
    /// Sessions to complete before the summary; 0 disables the goal
    pub goal_sessions: u32,
    /// Whether beats make a sound at all
    pub metronome: bool,
    pub sounds: SoundFiles,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            focus_minutes: 25,
            rest_minutes: 5,
            long_break_minutes: 30,
            goal_sessions: 8,
            metronome: true,
            sounds: SoundFiles::default(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file, falling back to defaults if it doesn't exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reject settings a person would never mean, such as a zero-minute focus
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, minutes) in [
            ("focus_minutes", self.focus_minutes),
            ("rest_minutes", self.rest_minutes),
            ("long_break_minutes", self.long_break_minutes),
        ] {
            if minutes == 0 {
                return Err(ConfigError::Invalid(format!("{} must be at least 1", name)));
            }
        }
        Ok(())
    }

    /// Replace every field the update carries; others are left untouched
    pub fn apply(&mut self, update: &ConfigUpdate) {
        if let Some(v) = update.focus_minutes {
            self.focus_minutes = v;
        }
        if let Some(v) = update.rest_minutes {
            self.rest_minutes = v;
        }
        if let Some(v) = update.long_break_minutes {
            self.long_break_minutes = v;
        }
        if let Some(v) = update.goal_sessions {
            self.goal_sessions = v;
        }
    }

    /// Whether a goal is set at all
    pub fn goal_enabled(&self) -> bool {
        self.goal_sessions != 0
    }

    pub fn focus_secs(&self) -> i64 {
        i64::from(self.focus_minutes) * 60
    }

    pub fn rest_secs(&self) -> i64 {
        i64::from(self.rest_minutes) * 60
    }

    pub fn long_break_secs(&self) -> i64 {
        i64::from(self.long_break_minutes) * 60
    }
}

/// A partial edit of the timer settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigUpdate {
    pub focus_minutes: Option<u32>,
    pub rest_minutes: Option<u32>,
    pub long_break_minutes: Option<u32>,
    pub goal_sessions: Option<u32>,
}

impl ConfigUpdate {
    pub fn focus(minutes: u32) -> Self {
        Self {
            focus_minutes: Some(minutes),
            ..Default::default()
        }
    }

    pub fn rest(minutes: u32) -> Self {
        Self {
            rest_minutes: Some(minutes),
            ..Default::default()
        }
    }

    pub fn long_break(minutes: u32) -> Self {
        Self {
            long_break_minutes: Some(minutes),
            ..Default::default()
        }
    }

    pub fn goal(sessions: u32) -> Self {
        Self {
            goal_sessions: Some(sessions),
            ..Default::default()
        }
    }

    /// True when the update carries no fields
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
