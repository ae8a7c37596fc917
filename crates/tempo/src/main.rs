//! tempo - Focus/rest interval timer
//!
//! Usage:
//!   tempo                       Open the timer with configured settings
//!   tempo run --focus 50        Override settings for this run
//!   tempo run --start           Start counting immediately
//!   tempo config                Show the effective configuration

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode},
};
use tracing_subscriber::EnvFilter;

use tempo::{keys, ui, Config, ConfigUpdate, Engine, Player, TokioScheduler};
use tempo_core::{format, Paths};

/// How often the status line is redrawn
const REDRAW_INTERVAL: Duration = Duration::from_millis(200);

/// tempo - Focus/rest interval timer with a metronome
#[derive(Parser)]
#[command(name = "tempo")]
#[command(about = "Focus/rest interval timer with a metronome and a session goal")]
#[command(version)]
#[command(after_help = r#"WHEN TO USE:
    For focused work in fixed intervals. A soft click keeps time while you
    focus, a notification marks each break, and every fourth break is long.

DEFAULTS:
    25 min focus, 5 min short break, 30 min long break, goal of 8 sessions.
    A goal of 0 disables the goal.

KEYS:
    space       Start / pause
    s           Skip to the next phase
    r           Reset the cycle
    f / F       Focus duration -1 / +1 minute
    b / B       Short break -1 / +1 minute
    l / L       Long break -1 / +1 minute
    g / G       Goal -1 / +1 session
    q, Esc      Quit

CONFIGURATION:
    ~/.config/tempo/config.json, or the file named by TEMPO_CONFIG / --config.
    Sound files are read from "sounds" in the config, or from
    ~/.local/share/tempo/sounds/{click,notification}.wav.

EXAMPLES:
    tempo                       # Open the timer
    tempo run --start           # Start focusing right away
    tempo run --focus 50 --rest 10 --goal 4
    tempo config --json         # Print effective settings
"#)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive timer
    #[command(alias = "r")]
    Run(RunArgs),

    /// Show the effective configuration
    #[command(alias = "cfg")]
    Config {
        /// Config file (default: ~/.config/tempo/config.json)
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Default)]
struct RunArgs {
    /// Focus duration in minutes
    #[arg(long, value_name = "MINS")]
    focus: Option<u32>,

    /// Short break duration in minutes
    #[arg(long, value_name = "MINS")]
    rest: Option<u32>,

    /// Long break duration in minutes
    #[arg(long, value_name = "MINS")]
    long_break: Option<u32>,

    /// Sessions before the summary (0 = no goal)
    #[arg(long, value_name = "SESSIONS")]
    goal: Option<u32>,

    /// Config file (default: ~/.config/tempo/config.json)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Start the countdown immediately
    #[arg(long)]
    start: bool,
}

impl RunArgs {
    fn overrides(&self) -> ConfigUpdate {
        ConfigUpdate {
            focus_minutes: self.focus,
            rest_minutes: self.rest,
            long_break_minutes: self.long_break,
            goal_sessions: self.goal,
        }
    }
}

fn main() -> Result<()> {
    // Logs go to stderr and stay off unless RUST_LOG is set
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let paths = Paths::new();

    match cli.command {
        Some(Commands::Run(args)) => cmd_run(&paths, args),
        Some(Commands::Config { config, json }) => cmd_config(&paths, config, json),
        None => cmd_run(&paths, RunArgs::default()),
    }
}

/// Load the config file, apply flag overrides and fill in bundled sounds
fn load_config(
    paths: &Paths,
    explicit: Option<PathBuf>,
    overrides: ConfigUpdate,
) -> Result<(PathBuf, Config)> {
    let path = paths.resolve_config(explicit);
    let mut config = Config::load(&path)?;
    config.apply(&overrides);
    config
        .validate()
        .with_context(|| format!("Invalid configuration from {}", path.display()))?;

    if config.sounds.click.is_none() {
        config.sounds.click = Some(paths.sound("click.wav")).filter(|p| p.exists());
    }
    if config.sounds.notification.is_none() {
        config.sounds.notification = Some(paths.sound("notification.wav")).filter(|p| p.exists());
    }

    Ok((path, config))
}

/// Run the interactive timer until the user quits
fn cmd_run(paths: &Paths, args: RunArgs) -> Result<()> {
    let (path, config) = load_config(paths, args.config.clone(), args.overrides())?;
    tracing::info!(path = %path.display(), ?config, "Starting tempo");

    let rt = tokio::runtime::Runtime::new().context("Failed to start timer runtime")?;
    let scheduler = Arc::new(TokioScheduler::new(rt.handle().clone()));
    let sounds = Arc::new(Player::from_config(&config));
    let engine = Engine::new(config, scheduler, sounds);

    if args.start {
        engine.start();
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, cursor::Hide)?;
    println!("{}\r", ui::HELP);

    let result = run_loop(&engine, &mut stdout);

    // Restore terminal
    engine.pause();
    disable_raw_mode()?;
    execute!(stdout, cursor::Show)?;
    println!();

    let snap = engine.snapshot();
    println!(
        "{} session{} completed",
        snap.sessions_completed,
        if snap.sessions_completed == 1 { "" } else { "s" }
    );

    result
}

fn run_loop(engine: &Engine, stdout: &mut io::Stdout) -> Result<()> {
    loop {
        ui::draw(stdout, &engine.snapshot(), &engine.config())?;

        if event::poll(REDRAW_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if let Some(command) = keys::command_for(key) {
                    if !keys::apply(engine, command) {
                        return Ok(());
                    }
                }
            }
        }
    }
}

/// Print the effective configuration
fn cmd_config(paths: &Paths, explicit: Option<PathBuf>, json: bool) -> Result<()> {
    let (path, config) = load_config(paths, explicit, ConfigUpdate::default())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let exists = if path.exists() { "" } else { " (not found, using defaults)" };
    println!("Config:      {}{}", path.display(), exists);
    println!("Focus:       {}", format::minutes(config.focus_minutes));
    println!("Short break: {}", format::minutes(config.rest_minutes));
    println!("Long break:  {}", format::minutes(config.long_break_minutes));
    if config.goal_enabled() {
        println!("Goal:        {} sessions", config.goal_sessions);
    } else {
        println!("Goal:        none");
    }
    println!("Metronome:   {}", if config.metronome { "on" } else { "off" });
    let show = |p: &Option<PathBuf>| {
        p.as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "terminal bell".to_string())
    };
    println!("Click:       {}", show(&config.sounds.click));
    println!("Notify:      {}", show(&config.sounds.notification));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_run_overrides() {
        let cli = Cli::parse_from(["tempo", "run", "--focus", "50", "--goal", "0", "--start"]);
        match cli.command {
            Some(Commands::Run(args)) => {
                assert!(args.start);
                let update = args.overrides();
                assert_eq!(update.focus_minutes, Some(50));
                assert_eq!(update.goal_sessions, Some(0));
                assert_eq!(update.rest_minutes, None);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_cli_default_is_run() {
        let cli = Cli::parse_from(["tempo"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_flag_overrides_are_validated() {
        let paths = Paths::new();
        let missing = std::env::temp_dir().join("tempo-test-missing-config.json");
        let err = load_config(&paths, Some(missing), ConfigUpdate::focus(0)).unwrap_err();
        assert!(format!("{:#}", err).contains("focus_minutes"));
    }
}
