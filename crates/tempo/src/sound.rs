//! Sound cues
//!
//! The engine never touches an audio device. It calls [`Sounds`], and the
//! front end decides what a cue means: a sound file played by the platform
//! player, a terminal bell, or nothing at all.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Mutex;

use tempo_core::Config;
use tracing::{debug, warn};

/// The two cues the engine emits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// Metronome beat while focusing
    Click,
    /// A focus phase has ended
    Notification,
}

/// Sound capability. Implementations must return quickly.
pub trait Sounds: Send + Sync {
    fn click(&self);
    fn notification(&self);
}

/// Plays nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl Sounds for Silent {
    fn click(&self) {}
    fn notification(&self) {}
}

/// Remembers every cue in order. Useful in tests and headless runs.
#[derive(Debug, Default)]
pub struct RecordingSounds {
    cues: Mutex<Vec<Cue>>,
}

impl RecordingSounds {
    pub fn new() -> Self {
        Self::default()
    }

    /// All cues so far, oldest first
    pub fn cues(&self) -> Vec<Cue> {
        self.cues.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn count(&self, cue: Cue) -> usize {
        self.cues().iter().filter(|c| **c == cue).count()
    }

    fn record(&self, cue: Cue) {
        if let Ok(mut cues) = self.cues.lock() {
            cues.push(cue);
        }
    }
}

impl Sounds for RecordingSounds {
    fn click(&self) {
        self.record(Cue::Click);
    }

    fn notification(&self) {
        self.record(Cue::Notification);
    }
}

/// Available audio players
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// macOS afplay
    Afplay,
    /// PulseAudio / PipeWire paplay
    Paplay,
    /// ALSA aplay
    Aplay,
    /// Terminal bell fallback
    Bell,
}

impl Backend {
    /// Detect the best available player for the current platform
    pub fn detect() -> Self {
        #[cfg(target_os = "macos")]
        {
            if Self::command_exists("afplay") {
                return Self::Afplay;
            }
        }

        #[cfg(target_os = "linux")]
        {
            if Self::command_exists("paplay") {
                return Self::Paplay;
            }
            if Self::command_exists("aplay") {
                return Self::Aplay;
            }
        }

        Self::Bell
    }

    /// Check if a command exists
    fn command_exists(cmd: &str) -> bool {
        Command::new("which")
            .arg(cmd)
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Afplay => "afplay",
            Self::Paplay => "paplay",
            Self::Aplay => "aplay",
            Self::Bell => "bell",
        }
    }

    fn command(&self, file: &Path) -> Option<Command> {
        let mut cmd = match self {
            Self::Afplay => Command::new("afplay"),
            Self::Paplay => Command::new("paplay"),
            Self::Aplay => {
                let mut cmd = Command::new("aplay");
                cmd.arg("-q");
                cmd
            }
            Self::Bell => return None,
        };
        cmd.arg(file)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        Some(cmd)
    }
}

/// Plays the configured files through a detected backend
#[derive(Debug, Clone)]
pub struct Player {
    backend: Backend,
    click: Option<PathBuf>,
    notification: Option<PathBuf>,
    metronome: bool,
}

impl Player {
    pub fn new(
        backend: Backend,
        click: Option<PathBuf>,
        notification: Option<PathBuf>,
        metronome: bool,
    ) -> Self {
        Self {
            backend,
            click,
            notification,
            metronome,
        }
    }

    /// Build a player from configuration, detecting the backend
    pub fn from_config(config: &Config) -> Self {
        let backend = Backend::detect();
        debug!(backend = backend.name(), "Detected audio backend");
        Self::new(
            backend,
            config.sounds.click.clone(),
            config.sounds.notification.clone(),
            config.metronome,
        )
    }

    fn play(&self, file: Option<&Path>) {
        let command = file.and_then(|f| self.backend.command(f));
        let Some(mut command) = command else {
            bell();
            return;
        };

        match command.spawn() {
            // Reap off-thread so the caller never waits on playback
            Ok(mut child) => {
                std::thread::spawn(move || {
                    let _ = child.wait();
                });
            }
            Err(e) => warn!(backend = self.backend.name(), error = %e, "Failed to play sound"),
        }
    }
}

impl Sounds for Player {
    fn click(&self) {
        if self.metronome {
            self.play(self.click.as_deref());
        }
    }

    fn notification(&self) {
        self.play(self.notification.as_deref());
    }
}

fn bell() {
    let mut out = std::io::stdout();
    let _ = out.write_all(b"\x07").and_then(|_| out.flush());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_keeps_order() {
        let sounds = RecordingSounds::new();
        sounds.click();
        sounds.notification();
        sounds.click();
        assert_eq!(sounds.cues(), vec![Cue::Click, Cue::Notification, Cue::Click]);
        assert_eq!(sounds.count(Cue::Click), 2);
        assert_eq!(sounds.count(Cue::Notification), 1);
    }

    #[test]
    fn test_bell_backend_has_no_command() {
        assert!(Backend::Bell.command(Path::new("click.wav")).is_none());
    }

    #[test]
    fn test_aplay_is_quiet() {
        let cmd = Backend::Aplay.command(Path::new("click.wav")).unwrap();
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(args, vec!["-q", "click.wav"]);
    }

    #[test]
    fn test_player_from_config_carries_files() {
        let mut config = Config::default();
        config.sounds.click = Some(PathBuf::from("/tmp/click.wav"));
        config.metronome = false;
        let player = Player::from_config(&config);
        assert_eq!(player.click.as_deref(), Some(Path::new("/tmp/click.wav")));
        assert!(player.notification.is_none());
        assert!(!player.metronome);
    }
}
