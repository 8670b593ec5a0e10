//! # spatialpack CLI entry point
//!
//! Parses command-line arguments, initialises tracing, and dispatches to
//! subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use spack_cli::rules::{run_rules, RulesArgs};
use spack_cli::validate::{run_validate, ValidateArgs};
use spack_cli::{load_config, EXIT_OPERATIONAL_ERROR};

/// Spatial Pack toolchain.
///
/// Validates pack directories (a spatialpack.json manifest plus layer
/// assets) and writes conformance reports.
#[derive(Parser, Debug)]
#[command(name = "spatialpack", version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a validator configuration file (YAML).
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a Spatial Pack directory.
    Validate(ValidateArgs),

    /// List validation rules and the checks under each.
    Rules(RulesArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "spatialpack CLI starting");

    let result = load_config(cli.config.as_deref()).and_then(|config| match &cli.command {
        Commands::Validate(args) => run_validate(args, &config),
        Commands::Rules(args) => run_rules(args, &config),
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(EXIT_OPERATIONAL_ERROR)
        }
    }
}
