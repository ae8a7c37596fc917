//! Key bindings for the terminal front end
//!
//! Keys map to [`Command`]s, and commands are applied to an [`Engine`].
//! Lowercase letters shorten a setting by one, uppercase lengthen it.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tempo_core::ConfigUpdate;

use crate::engine::Engine;

/// A setting adjustable from the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
    Focus,
    Rest,
    LongBreak,
    Goal,
}

/// What a key press asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Toggle,
    Skip,
    Reset,
    Adjust(Setting, i32),
    Quit,
}

/// Map a key press to a command
pub fn command_for(key: KeyEvent) -> Option<Command> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Command::Quit);
    }

    let command = match key.code {
        KeyCode::Char(' ') | KeyCode::Char('p') | KeyCode::Enter => Command::Toggle,
        KeyCode::Char('s') => Command::Skip,
        KeyCode::Char('r') => Command::Reset,
        KeyCode::Char('f') => Command::Adjust(Setting::Focus, -1),
        KeyCode::Char('F') => Command::Adjust(Setting::Focus, 1),
        KeyCode::Char('b') => Command::Adjust(Setting::Rest, -1),
        KeyCode::Char('B') => Command::Adjust(Setting::Rest, 1),
        KeyCode::Char('l') => Command::Adjust(Setting::LongBreak, -1),
        KeyCode::Char('L') => Command::Adjust(Setting::LongBreak, 1),
        KeyCode::Char('g') => Command::Adjust(Setting::Goal, -1),
        KeyCode::Char('G') => Command::Adjust(Setting::Goal, 1),
        KeyCode::Char('q') | KeyCode::Esc => Command::Quit,
        _ => return None,
    };
    Some(command)
}

/// Apply a command. Returns false when the front end should exit.
pub fn apply(engine: &Engine, command: Command) -> bool {
    match command {
        Command::Toggle => {
            engine.toggle_running();
        }
        Command::Skip => {
            engine.skip();
        }
        Command::Reset => engine.reset(),
        // The goal summary only offers reset and quit
        Command::Adjust(_, _) if engine.snapshot().goal_reached => {}
        Command::Adjust(setting, delta) => engine.update_config(adjusted(engine, setting, delta)),
        Command::Quit => return false,
    }
    true
}

/// Durations never drop below one minute; the goal may drop to 0 (off)
fn adjusted(engine: &Engine, setting: Setting, delta: i32) -> ConfigUpdate {
    let config = engine.config();
    let step = |value: u32, floor: u32| value.saturating_add_signed(delta).max(floor);

    match setting {
        Setting::Focus => ConfigUpdate::focus(step(config.focus_minutes, 1)),
        Setting::Rest => ConfigUpdate::rest(step(config.rest_minutes, 1)),
        Setting::LongBreak => ConfigUpdate::long_break(step(config.long_break_minutes, 1)),
        Setting::Goal => ConfigUpdate::goal(step(config.goal_sessions, 0)),
    }
}
