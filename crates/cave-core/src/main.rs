//! Cave Hunt
//!
//! Terminal driver: play by typing commands, or let the exploration policy
//! play on its own with `--auto`.

use cave_core::{
    ConfigError, EventLogger, GameConfig, Session, SessionProgress, DEFAULT_CONFIG_PATH,
};
use cave_events::{Action, Direction, Outcome};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Command line arguments for the game
#[derive(Parser, Debug)]
#[command(name = "cave_hunt")]
#[command(about = "Find the treasure, dodge the pits, outwit the beast")]
struct Args {
    /// Random seed for reproducibility
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Configuration file (defaults to ./cave.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the grid size from the configuration
    #[arg(long)]
    grid_size: Option<usize>,

    /// Override the pit count from the configuration
    #[arg(long)]
    pits: Option<usize>,

    /// Let the exploration policy play until the game ends
    #[arg(long)]
    auto: bool,

    /// Turn limit for autonomous play
    #[arg(long, default_value_t = 200)]
    max_turns: u64,

    /// Write turn events to this JSONL file
    #[arg(long)]
    events: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if args.verbose {
            EnvFilter::new("cave_core=debug")
        } else {
            EnvFilter::new("cave_core=info")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };

    let mut session = match Session::new(config, args.seed) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };

    if let Some(path) = &args.events {
        match EventLogger::new(path) {
            Ok(logger) => session = session.with_event_logger(logger),
            Err(e) => eprintln!("Warning: Could not open event log {}: {}", path.display(), e),
        }
    }

    println!("Cave Hunt");
    println!("=========");
    println!("Seed: {}", args.seed);
    println!(
        "Grid: {0}x{0}, pits: {1}",
        session.config().world.grid_size,
        session.config().world.pit_count
    );
    println!();

    if args.auto {
        run_autonomous(&mut session, args.max_turns);
    } else {
        run_interactive(&mut session, args.max_turns);
    }

    if let Err(e) = session.flush_events() {
        eprintln!("Warning: Could not flush event log: {}", e);
    }
}

/// Explicit `--config`, else `cave.toml` if present, else defaults; then
/// command line overrides.
fn load_config(args: &Args) -> Result<GameConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => GameConfig::from_file(path)?,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            GameConfig::from_file(Path::new(DEFAULT_CONFIG_PATH))?
        }
        None => GameConfig::default(),
    };

    if let Some(grid_size) = args.grid_size {
        config.world.grid_size = grid_size;
    }
    if let Some(pits) = args.pits {
        config.world.pit_count = pits;
    }
    config.validate()?;
    Ok(config)
}

fn run_autonomous(session: &mut Session, max_turns: u64) {
    while !session.is_over() && session.turn() < max_turns {
        let action = session.compute_autonomous_action();
        if action.is_idle() {
            println!("The explorer sees no safe way forward and stops.");
            break;
        }
        step(session, action);
    }
    print_status(session);
}

fn run_interactive(session: &mut Session, max_turns: u64) {
    println!("Commands: up, down, left, right, shoot <dir>, auto, status, view, reset, quit");
    print_status(session);

    let stdin = io::stdin();
    loop {
        print!("> ");
        if io::stdout().flush().is_err() {
            break;
        }

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }

        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            continue;
        };

        match command.to_ascii_lowercase().as_str() {
            "quit" | "q" | "exit" => break,
            "status" => print_status(session),
            "view" => match serde_json::to_string_pretty(&session.current_view()) {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("Error: {}", e),
            },
            "auto" => {
                let limit = session.turn() + max_turns;
                run_autonomous(session, limit);
            }
            "reset" => match session.reset() {
                Ok(()) => {
                    println!("A new cave opens before you.");
                    print_status(session);
                }
                Err(e) => eprintln!("Error: {}", e),
            },
            "shoot" | "attack" => match words.next().map(str::parse::<Direction>) {
                Some(Ok(direction)) => step(session, Action::Attack(direction)),
                Some(Err(e)) => println!("{}", e),
                None => println!("Shoot which way?"),
            },
            other => match other.parse::<Direction>() {
                Ok(direction) => step(session, Action::Move(direction)),
                Err(_) => println!("Unknown command: {}", other),
            },
        }
    }
}

/// Applies one action and prints what happened.
fn step(session: &mut Session, action: Action) {
    match session.apply_action(action) {
        Ok(report) => {
            let position = session.explorer().position;
            match &report.notification {
                Some(text) => println!("[Turn {:>3}] {} -> {}: {}", report.turn, action, position, text),
                None => println!("[Turn {:>3}] {} -> {}", report.turn, action, position),
            }
            match report.state.outcome() {
                Some(Outcome::Victory) => println!("You win! Escaped in {} turns.", report.turn),
                Some(Outcome::Defeat) => println!("Game over. The cave claims another explorer."),
                None => {}
            }
        }
        Err(rejected) => println!("Can't do that: {}", rejected),
    }
}

fn print_status(session: &Session) {
    let explorer = session.explorer();
    let SessionProgress {
        state, turn, heard_scream, ..
    } = session.progress();
    println!(
        "Turn {} | at {} | lives {} | arrow {} | treasure {} | {}{}",
        turn,
        explorer.position,
        explorer.lives,
        if explorer.has_arrow { "yes" } else { "no" },
        if explorer.has_treasure { "yes" } else { "no" },
        state,
        if *heard_scream { " | the beast is dead" } else { "" }
    );
}
