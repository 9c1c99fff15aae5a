//! slotcheck: scheduling conflict analysis from the command line.
//!
//! Commands:
//! - `slotcheck analyze` - Detect conflicts in a JSON array of slots
//! - `slotcheck defaults` - Print the default options and observance table

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "slotcheck")]
#[command(about = "Detect and explain scheduling conflicts in a day of time slots")]
#[command(version)]
struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a JSON array of time slots
    Analyze {
        /// Path to the slots file
        slots: PathBuf,

        /// JSON file with detection options (any subset of fields)
        #[arg(long)]
        options: Option<PathBuf>,

        /// JSON object of observance clock times, e.g. {"dhuhr": "12:45"}
        #[arg(long)]
        observances: Option<PathBuf>,

        /// IANA timezone of the provider's day (overrides the options file)
        #[arg(long)]
        timezone: Option<String>,

        /// Partition conflicts into resolved and unresolved
        #[arg(long)]
        auto_resolve: bool,

        /// Print single-line JSON
        #[arg(long)]
        compact: bool,
    },

    /// Print the default options and observance table
    Defaults {
        /// Print single-line JSON
        #[arg(long)]
        compact: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Analyze {
            slots,
            options,
            observances,
            timezone,
            auto_resolve,
            compact,
        } => commands::analyze::run(&commands::analyze::AnalyzeArgs {
            slots,
            options,
            observances,
            timezone,
            auto_resolve,
            compact,
        }),
        Commands::Defaults { compact } => commands::defaults::run(compact),
    }
}
