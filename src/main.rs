//! Frontier CLI - generate, tune and inspect strategy game maps and saves.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod cli;

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Frontier - A deterministic rules engine for turn-based grid strategy games
#[derive(Parser, Debug)]
#[command(name = "frontier")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable debug logging (overridden by `RUST_LOG`)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start a new game and print its opening position
    Generate {
        /// Game configuration file (JSON, default: built-in rules)
        #[arg(short, long)]
        config: Option<std::path::PathBuf>,

        /// Map seed (default: config seed, else random)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Map width override
        #[arg(long)]
        width: Option<u16>,

        /// Map height override
        #[arg(long)]
        height: Option<u16>,

        /// Save the opening snapshot to file
        #[arg(long)]
        save: Option<std::path::PathBuf>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },

    /// Generate many maps in parallel and report terrain shares
    Tune {
        /// Game configuration file (JSON, default: built-in rules)
        #[arg(short, long)]
        config: Option<std::path::PathBuf>,

        /// Number of maps to generate (default: 100)
        #[arg(short, long, default_value = "100")]
        maps: u64,

        /// Starting seed (increments for each map)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Parallel threads (default: CPU count)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Show progress bar
        #[arg(short, long)]
        progress: bool,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },

    /// Validate a saved snapshot and print its contents
    Inspect {
        /// Snapshot file (JSON)
        #[arg(required = true)]
        snapshot: std::path::PathBuf,

        /// Also draw the map
        #[arg(long)]
        map: bool,
    },
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    let result = match args.command {
        Commands::Generate {
            config,
            seed,
            width,
            height,
            save,
            format,
        } => cli::generate::execute(config, seed, width, height, save, format),

        Commands::Tune {
            config,
            maps,
            seed,
            threads,
            progress,
            format,
        } => cli::tune::execute(config, maps, seed, threads, progress, format),

        Commands::Inspect { snapshot, map } => cli::inspect::execute(snapshot, map),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
