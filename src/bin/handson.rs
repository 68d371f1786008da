// HandsOn CLI - human-paced pointer and keyboard actuation
// This binary wires the library to the terminal: argument parsing, setup, logging

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use handson::config_file::{Config, RuntimeConfig};
use handson::constants::{DEFAULT_PAUSE_KEY, DEFAULT_SPEED_KEY, DEFAULT_STOP_KEY};
use handson::motion::Point;
use handson::pointer::ScreenTarget;
use handson::typing::SessionOutcome;
use handson::utils::keycode::parse_hotkey_code;
use handson::HandsOnCore;
use log::{error, info, warn};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Drive the pointer and keyboard at a human pace
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Drive the pointer and keyboard at a human pace",
    long_about = "Drive the pointer and keyboard at a human pace.

Pointer moves follow one of eight randomized motion profiles; typing varies
its speed per word, fumbles the occasional key and fixes it.

SETUP:
  handson setup

  Configuration is stored at:
    ~/Library/Application Support/handson/config.toml

HOTKEYS (while typing):
  Ctrl+Cmd+Shift+P          Pause / resume
  Ctrl+Cmd+Shift+X          Emergency stop
  Ctrl+Cmd+Shift+Right      Speed up by 10%"
)]
struct Args {
    /// Record events and print them instead of injecting them
    #[arg(long, global = true)]
    dry_run: bool,

    /// Config file to use instead of the standard location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Type text into the focused window (reads stdin when no text is given)
    Type {
        text: Option<String>,
        /// Read the text from a file
        #[arg(long, conflicts_with = "text")]
        file: Option<PathBuf>,
    },
    /// Move the pointer
    Move {
        x: f64,
        y: f64,
        /// Treat x and y as fractions of the screen (0.0-1.0)
        #[arg(long)]
        normalized: bool,
    },
    /// Click with the primary button
    Click {
        x: f64,
        y: f64,
        /// Treat x and y as fractions of the screen (0.0-1.0)
        #[arg(long)]
        normalized: bool,
    },
    /// Idle the pointer around the screen like someone reading
    Wander {
        /// Number of moves
        #[arg(long, default_value_t = 5)]
        count: u32,
        /// Shortest reading pause between moves, seconds
        #[arg(long, default_value_t = 1.0)]
        min_pause: f64,
        /// Longest reading pause between moves, seconds
        #[arg(long, default_value_t = 4.0)]
        max_pause: f64,
    },
    /// Interactively create the configuration file
    Setup,
}

/// Prompt for a value, falling back to `default` on empty input
fn prompt<T: std::str::FromStr>(prompt: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();

    if input.is_empty() {
        Ok(default)
    } else {
        input
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Invalid value '{}': {}", input, e))
    }
}

fn prompt_key(label: &str, default: &str) -> Result<String> {
    let key: String = prompt(
        &format!("{} key, used with Ctrl+Cmd+Shift (default: {}): ", label, default),
        default.to_string(),
    )?;
    parse_hotkey_code(&key).with_context(|| format!("Invalid {} key", label.to_lowercase()))?;
    Ok(key)
}

/// Run interactive setup to configure typing speed and hotkeys
fn run_setup(path: Option<PathBuf>) -> Result<()> {
    println!("HandsOn Setup");
    println!("=============\n");

    let defaults = Config::default();
    let config = Config {
        wpm_min: prompt(
            &format!("Minimum words per minute (default: {}): ", defaults.wpm_min),
            defaults.wpm_min,
        )?,
        wpm_max: prompt(
            &format!("Maximum words per minute (default: {}): ", defaults.wpm_max),
            defaults.wpm_max,
        )?,
        error_rate: prompt(
            &format!("Typo probability per word (default: {}): ", defaults.error_rate),
            defaults.error_rate,
        )?,
        pause_hotkey: prompt_key("Pause", DEFAULT_PAUSE_KEY)?,
        stop_hotkey: prompt_key("Stop", DEFAULT_STOP_KEY)?,
        speed_hotkey: prompt_key("Speed-up", DEFAULT_SPEED_KEY)?,
        ..defaults
    };

    let saved_to = match path {
        Some(path) => {
            config.save_to_path(&path).context("Failed to save configuration")?;
            path
        }
        None => config.save().context("Failed to save configuration")?,
    };

    println!("\nConfiguration saved to: {}", saved_to.display());
    println!("Setup complete!");
    Ok(())
}

fn read_text(text: Option<String>, file: Option<PathBuf>) -> Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    if let Some(file) = file {
        return std::fs::read_to_string(&file)
            .with_context(|| format!("Failed to read {}", file.display()));
    }
    let mut text = String::new();
    io::stdin()
        .read_to_string(&mut text)
        .context("Failed to read text from stdin")?;
    // A trailing newline from the shell is not part of the text
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

fn target(x: f64, y: f64, normalized: bool) -> ScreenTarget {
    if normalized {
        ScreenTarget::Normalized { x, y }
    } else {
        ScreenTarget::Absolute(Point::new(x, y))
    }
}

fn run(core: &mut HandsOnCore, command: Command) -> Result<()> {
    match command {
        Command::Type { text, file } => {
            let text = read_text(text, file)?;
            match core.type_text(&text)? {
                SessionOutcome::Completed => info!("Typed {} chars", text.chars().count()),
                SessionOutcome::Stopped => warn!("Typing stopped before the end of the text"),
                SessionOutcome::LockBusy { age } => bail!(
                    "Another typing session is running (started {}s ago)",
                    age.as_secs()
                ),
                SessionOutcome::Empty => warn!("Nothing to type"),
            }
        }
        Command::Move { x, y, normalized } => {
            core.begin_pointer_session();
            let report = core.pointer().move_to_target(target(x, y, normalized))?;
            info!(
                "Moved over {} points in {:?}",
                report.points, report.duration
            );
        }
        Command::Click { x, y, normalized } => {
            core.begin_pointer_session();
            let intent = core.pointer().click_target(target(x, y, normalized))?;
            info!("Clicked {:?} at {}", intent.button, intent.point);
        }
        Command::Wander {
            count,
            min_pause,
            max_pause,
        } => {
            if !(min_pause >= 0.0 && max_pause >= min_pause) {
                bail!("Pauses must satisfy 0 <= min-pause <= max-pause");
            }
            core.begin_pointer_session();
            for _ in 0..count {
                core.pointer().move_away_from_options()?;
                core.pointer().simulate_reading_pause(
                    Duration::from_secs_f64(min_pause),
                    Duration::from_secs_f64(max_pause),
                );
            }
            info!(
                "Wandered {} times (fatigue damping {:.3})",
                count,
                core.fatigue.damping()
            );
        }
        // Handled in main before the core is built
        Command::Setup => {}
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Command::Setup = args.command {
        return run_setup(args.config);
    }

    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("Starting HandsOn");

    let config_path = match args.config {
        Some(path) => path,
        None => Config::config_path()?,
    };
    let runtime = Arc::new(RuntimeConfig::open(&config_path).context("Failed to load configuration")?);
    info!("Configuration: {}", runtime.path().display());

    let mut core = if args.dry_run {
        HandsOnCore::dry_run(runtime)
    } else {
        match HandsOnCore::native(runtime) {
            Ok(core) => core,
            Err(e) => {
                error!("{:#}", e);
                std::process::exit(1);
            }
        }
    };

    run(&mut core, args.command)?;

    if let Some(events) = core.recorded_events() {
        for event in &events {
            println!("{}", event);
        }
        println!(
            "\n{} events, {:.2}s of simulated time",
            events.len(),
            core.simulated_time().unwrap_or_default().as_secs_f64()
        );
        if let Some(text) = core.rendered_text().filter(|t| !t.is_empty()) {
            println!("Rendered text:\n{}", text);
        }
    }

    Ok(())
}
