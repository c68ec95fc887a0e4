//! Jaqal Command-Line Interface
//!
//! The main entry point for the `jaqal` tool: schedules Jaqal circuits stored
//! as JSON and writes them back as Jaqal source or JSON.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::{emit, gates, schedule, version};
use config::Config;

/// jaqal - parallelizing scheduler for Jaqal trapped-ion circuits
#[derive(Parser)]
#[command(name = "jaqal")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (defaults to ~/.jaqal/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Schedule the unscheduled blocks of a circuit
    Schedule {
        /// Input circuit (JSON)
        #[arg(short, long)]
        input: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,

        /// Output format (jaqal, json)
        #[arg(short, long)]
        format: Option<String>,

        /// Skip verification of the scheduled circuit
        #[arg(long)]
        no_verify: bool,

        /// Native gate table to check the circuit against (YAML or JSON)
        #[arg(long)]
        native_gates: Option<String>,
    },

    /// Write a circuit as Jaqal source without scheduling it
    Emit {
        /// Input circuit (JSON)
        #[arg(short, long)]
        input: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// List the native gate table
    Gates {
        /// Native gate table file (YAML or JSON)
        #[arg(long)]
        native_gates: Option<String>,
    },

    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    };

    // Setup logging
    let filter = match cli.verbose {
        0 => config.logging.level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    let result = match cli.command {
        Commands::Schedule {
            input,
            output,
            format,
            no_verify,
            native_gates,
        } => schedule::execute(
            &config,
            &input,
            output.as_deref(),
            format.as_deref(),
            no_verify,
            native_gates.as_deref(),
        ),

        Commands::Emit { input, output } => emit::execute(&input, output.as_deref()),

        Commands::Gates { native_gates } => gates::execute(&config, native_gates.as_deref()),

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
