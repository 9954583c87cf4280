//! staffdrill - spaced-repetition note reading trainer
//!
//! CLI entry point with global panic handler.

use std::io::{self, Write};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing_subscriber::EnvFilter;

use staffdrill::cli::config_cmd::{ConfigAction, ConfigCommand, ConfigOptions};
use staffdrill::cli::init::{InitCommand, InitOptions};
use staffdrill::cli::reset::{ResetCommand, ResetOptions};
use staffdrill::cli::stats::{StatsCommand, StatsOptions};
use staffdrill::cli::train::{TrainCommand, TrainOptions};
use staffdrill::cli::Clock;
use staffdrill::config::crash_log_path;
use staffdrill::core::Clef;
use staffdrill::error::exit_codes;
use staffdrill::storage::FileStore;

/// Environment variable holding the log filter.
const ENV_LOG: &str = "STAFFDRILL_LOG";

// =============================================================================
// CLI Definition
// =============================================================================

/// staffdrill - learn to read notes on the treble and bass staff
#[derive(Parser)]
#[command(name = "staffdrill")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the deck from the current config
    Init {
        /// Rebuild even if a deck exists (progress is lost)
        #[arg(long, short)]
        force: bool,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Drill due and new cards
    Train {
        /// Clef to train (treble or bass)
        #[arg(long, short)]
        clef: Option<Clef>,
        /// Stop after this many prompts
        #[arg(long, short)]
        rounds: Option<usize>,
        /// Seed for the card order
        #[arg(long)]
        seed: Option<u64>,
        /// Print the summary as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress the summary
        #[arg(long, short)]
        quiet: bool,
    },

    /// Show study statistics
    Stats {
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Show or change training settings
    Config {
        #[command(subcommand)]
        action: Option<ConfigSubcommand>,
        /// Output as JSON
        #[arg(long, short, global = true)]
        json: bool,
        /// Suppress output
        #[arg(long, short, global = true)]
        quiet: bool,
    },

    /// Delete the deck and review history
    Reset {
        /// Confirm the reset
        #[arg(long, short)]
        yes: bool,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },
}

#[derive(Subcommand)]
enum ConfigSubcommand {
    /// Print the current settings and presets
    Show,
    /// Apply a preset (beginner, intermediate, advanced, treble-only, bass-only)
    Preset { name: String },
    /// Set the range of a clef, e.g. `range treble C4 G5`
    Range {
        clef: Clef,
        start: String,
        end: String,
    },
    /// Enable or disable a clef
    Clef { clef: Clef },
    /// Turn infinite mode on or off
    Infinite {
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },
    /// Turn four-note mode on or off
    FourNote {
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },
}

impl From<ConfigSubcommand> for ConfigAction {
    fn from(command: ConfigSubcommand) -> Self {
        match command {
            ConfigSubcommand::Show => ConfigAction::Show,
            ConfigSubcommand::Preset { name } => ConfigAction::Preset(name),
            ConfigSubcommand::Range { clef, start, end } => ConfigAction::Range { clef, start, end },
            ConfigSubcommand::Clef { clef } => ConfigAction::ToggleClef(clef),
            ConfigSubcommand::Infinite { enabled } => ConfigAction::Infinite(enabled),
            ConfigSubcommand::FourNote { enabled } => ConfigAction::FourNote(enabled),
        }
    }
}

// =============================================================================
// Main Entry Point
// =============================================================================

fn main() -> ExitCode {
    setup_panic_handler();
    setup_logging();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("staffdrill error: {}", e);
            ExitCode::from(exit_codes::ERROR as u8)
        }
    }
}

/// Log to stderr, filtered by `STAFFDRILL_LOG` (default `warn`).
fn setup_logging() {
    let filter = EnvFilter::try_from_env(ENV_LOG).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Set up the global panic handler.
///
/// On panic, appends to the crash log in the staffdrill home and exits with
/// code 3.
fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("staffdrill panic: {}", info);

        if let Ok(mut file) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(crash_log_path())
        {
            let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
            let _ = writeln!(file, "[{}] {}", timestamp, info);
        }

        std::process::exit(exit_codes::CRASH);
    }));
}

/// Run the CLI and return the exit code.
fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let store = FileStore::open_default()?;
    let clock = Clock::system();

    match cli.command {
        Commands::Init { force, json, quiet } => {
            let cmd = InitCommand::new(store, clock);
            let options = InitOptions { json, quiet, force };
            let output = cmd.run(&options);
            Ok(emit(cmd.format_output(&output, &options), output.success))
        }
        Commands::Train {
            clef,
            rounds,
            seed,
            json,
            quiet,
        } => run_train(store, clock, clef, rounds, seed, json, quiet),
        Commands::Stats { json, quiet } => {
            let cmd = StatsCommand::new(store, clock);
            let options = StatsOptions { json, quiet };
            let output = cmd.run(&options);
            Ok(emit(cmd.format_output(&output, &options), output.success))
        }
        Commands::Config {
            action,
            json,
            quiet,
        } => {
            let cmd = ConfigCommand::new(store, clock);
            let options = ConfigOptions { json, quiet };
            let action = action.map(ConfigAction::from).unwrap_or(ConfigAction::Show);
            let output = cmd.run(&action, &options);
            Ok(emit(cmd.format_output(&output, &options), output.success))
        }
        Commands::Reset { yes, json, quiet } => {
            let cmd = ResetCommand::new(store, clock);
            let options = ResetOptions { json, quiet, yes };
            let output = cmd.run(&options);
            Ok(emit(cmd.format_output(&output, &options), output.success))
        }
    }
}

// =============================================================================
// Command Implementations
// =============================================================================

fn run_train(
    store: FileStore,
    clock: Clock,
    clef: Option<Clef>,
    rounds: Option<usize>,
    seed: Option<u64>,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cmd = TrainCommand::new(store, clock);
    let options = TrainOptions {
        clef,
        rounds,
        use_env: true,
        json,
        quiet,
    };

    let mut rng: Box<dyn RngCore> = match seed {
        Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
        None => Box::new(rand::rng()),
    };
    // Keep stdout clean for the JSON summary.
    let mut prompts: Box<dyn Write> = if json {
        Box::new(io::stderr().lock())
    } else {
        Box::new(io::stdout().lock())
    };
    let output = cmd.run(&options, &mut io::stdin().lock(), &mut prompts, &mut *rng);
    drop(prompts);

    Ok(emit(cmd.format_output(&output, &options), output.success))
}

/// Print formatted output and map success to an exit code.
fn emit(formatted: String, success: bool) -> ExitCode {
    if !formatted.is_empty() {
        println!("{}", formatted);
    }
    success_to_exit_code(success)
}

/// Convert success boolean to exit code.
fn success_to_exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::from(exit_codes::SUCCESS as u8)
    } else {
        ExitCode::from(exit_codes::ERROR as u8)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_codes::SUCCESS, 0);
        assert_eq!(exit_codes::ERROR, 1);
        assert_eq!(exit_codes::CRASH, 3);
    }

    #[test]
    fn test_success_to_exit_code() {
        assert_eq!(
            success_to_exit_code(true),
            ExitCode::from(exit_codes::SUCCESS as u8)
        );
        assert_eq!(
            success_to_exit_code(false),
            ExitCode::from(exit_codes::ERROR as u8)
        );
    }

    #[test]
    fn test_cli_parse_train() {
        let cli = Cli::parse_from([
            "staffdrill",
            "train",
            "--clef",
            "bass",
            "--rounds",
            "5",
            "--seed",
            "42",
        ]);
        match cli.command {
            Commands::Train {
                clef, rounds, seed, ..
            } => {
                assert_eq!(clef, Some(Clef::Bass));
                assert_eq!(rounds, Some(5));
                assert_eq!(seed, Some(42));
            }
            _ => panic!("Expected Train command"),
        }
    }

    #[test]
    fn test_cli_parse_config_range() {
        let cli = Cli::parse_from(["staffdrill", "config", "range", "treble", "C4", "G5"]);
        match cli.command {
            Commands::Config {
                action: Some(action),
                ..
            } => {
                assert_eq!(
                    ConfigAction::from(action),
                    ConfigAction::Range {
                        clef: Clef::Treble,
                        start: "C4".to_string(),
                        end: "G5".to_string(),
                    }
                );
            }
            _ => panic!("Expected Config command"),
        }
    }

    #[test]
    fn test_cli_parse_config_flags() {
        let cli = Cli::parse_from(["staffdrill", "config", "four-note", "true", "--json"]);
        match cli.command {
            Commands::Config {
                action: Some(action),
                json,
                ..
            } => {
                assert!(json);
                assert_eq!(ConfigAction::from(action), ConfigAction::FourNote(true));
            }
            _ => panic!("Expected Config command"),
        }

        let cli = Cli::parse_from(["staffdrill", "config"]);
        assert!(matches!(cli.command, Commands::Config { action: None, .. }));
    }

    #[test]
    fn test_cli_parse_reset() {
        let cli = Cli::parse_from(["staffdrill", "reset", "--yes"]);
        assert!(matches!(cli.command, Commands::Reset { yes: true, .. }));
    }

    #[test]
    fn test_cli_rejects_unknown_clef() {
        assert!(Cli::try_parse_from(["staffdrill", "train", "--clef", "alto"]).is_err());
    }
}
