//! Terminal status line
//!
//! The whole interface is one line, redrawn in place. Layout:
//!
//! ```text
//! ▶ 24:13  Focus Time  sessions 2/8  ends 14:32  [focus 25m · break 5m · long 30m]
//! ```

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Local, TimeDelta};
use crossterm::{
    cursor, queue,
    style::{Print, Stylize},
    terminal::{Clear, ClearType},
};
use tempo_core::{format, Config};

use crate::session::Snapshot;

/// Key help printed once under the status line
pub const HELP: &str =
    "space start/pause · s skip · r reset · f/F b/B l/L g/G adjust · q quit";

/// Build the status line for a snapshot at local time `now`
pub fn status_line(snap: &Snapshot, config: &Config, now: DateTime<Local>) -> String {
    if snap.goal_reached {
        return format!(
            "Congratulations! You've completed your goal of {} sessions. Press r to start again.",
            config.goal_sessions
        );
    }

    let state = if snap.running { "▶" } else { "⏸" };

    let sessions = if config.goal_enabled() {
        format!("{}/{}", snap.sessions_completed, config.goal_sessions)
    } else {
        snap.sessions_completed.to_string()
    };

    let ends = if snap.running {
        let end = now + TimeDelta::seconds(snap.seconds_remaining.max(0));
        format!("ends {}", end.format("%H:%M"))
    } else {
        "paused".to_string()
    };

    format!(
        "{} {}  {}  sessions {}  {}  [focus {} · break {} · long {}]",
        state,
        snap.clock(),
        snap.phase_label(),
        sessions,
        ends,
        format::minutes(config.focus_minutes),
        format::minutes(config.rest_minutes),
        format::minutes(config.long_break_minutes),
    )
}

/// Redraw the status line in place
pub fn draw(out: &mut impl Write, snap: &Snapshot, config: &Config) -> Result<()> {
    let line = status_line(snap, config, Local::now());
    let styled = if snap.goal_reached {
        line.bold().cyan()
    } else if snap.phase.is_break() {
        line.green()
    } else {
        line.magenta()
    };

    queue!(
        out,
        cursor::MoveToColumn(0),
        Clear(ClearType::CurrentLine),
        Print(styled)
    )?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Phase;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 1, h, m, 0).unwrap()
    }

    fn snap(running: bool) -> Snapshot {
        Snapshot {
            phase: Phase::Focus,
            seconds_remaining: 24 * 60 + 13,
            sessions_completed: 2,
            running,
            goal_reached: false,
        }
    }

    #[test]
    fn test_running_line() {
        let line = status_line(&snap(true), &Config::default(), at(14, 0));
        assert!(line.starts_with("▶ 24:13  Focus Time  sessions 2/8  ends 14:24"));
        assert!(line.ends_with("[focus 25m · break 5m · long 30m]"));
    }

    #[test]
    fn test_paused_line_without_goal() {
        let config = Config {
            goal_sessions: 0,
            ..Default::default()
        };
        let line = status_line(&snap(false), &config, at(14, 0));
        assert!(line.contains("sessions 2  paused"));
    }

    #[test]
    fn test_goal_line() {
        let mut s = snap(false);
        s.goal_reached = true;
        s.phase = Phase::ShortBreak;
        let line = status_line(&s, &Config::default(), at(9, 0));
        assert!(line.contains("goal of 8 sessions"));
    }

    #[test]
    fn test_draw_writes_line() {
        let mut out = Vec::new();
        draw(&mut out, &snap(true), &Config::default()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Focus Time"));
    }
}
