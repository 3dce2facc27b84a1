//! EGMS CLI - batch downloader for European Ground Motion Service tiles
//!
//! This binary drives the `egms` library: it turns tile selections into
//! batch plans, runs them against the archive API and writes the result.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::grid::GridArgs;
use commands::orbit::OrbitArgs;

#[derive(Parser)]
#[command(name = "egms")]
#[command(about = "Batch downloader for European Ground Motion Service tiles", long_about = None)]
#[command(version)]
struct Cli {
    /// Echo log output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch L3 tiles on the 100 km grid
    Grid(GridArgs),

    /// Fetch L2a/L2b bursts by relative orbit and burst cycle
    Orbit(OrbitArgs),

    /// View or modify configuration settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Grid(args) => commands::grid::run(args, cli.verbose),
        Commands::Orbit(args) => commands::orbit::run(args, cli.verbose),
        Commands::Config { command } => commands::config::run(command),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
