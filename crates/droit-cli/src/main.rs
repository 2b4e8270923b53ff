//! # droit CLI entry point
//!
//! Parses command-line arguments, installs logging, loads configuration and
//! dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use droit_cli::cross_border::{run_cross_border, CrossBorderArgs};
use droit_cli::evaluate::{run_evaluate, run_partial, EvaluateArgs, PartialArgs};
use droit_cli::inspect::{run_inspect, InspectArgs};
use droit_cli::layout::{run_layout, LayoutArgs};
use droit_cli::validate::{run_validate, ValidateArgs};
use droit_cli::{CliContext, DroitConfig};

/// Exit code for operational failures.
const EXIT_ERROR: u8 = 2;

/// Droit: regulatory decision-tree evaluation.
///
/// Validates and evaluates rule trees, explains incomplete evaluations,
/// composes cross-border scenarios and lays trees out for rendering.
#[derive(Parser, Debug)]
#[command(name = "droit", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    /// `RUST_LOG` takes precedence when set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log line format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    /// Path to configuration file. Falls back to `$DROIT_CONFIG`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write JSON output to this file instead of stdout.
    #[arg(long, short, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate rule documents against the schema and structural checks.
    Validate(ValidateArgs),

    /// Summarize a rule: node counts, fact paths, digest.
    Inspect(InspectArgs),

    /// Evaluate a rule against a fact file.
    Evaluate(EvaluateArgs),

    /// Partially evaluate a rule, listing reachable outcomes and missing facts.
    Partial(PartialArgs),

    /// Evaluate a multi-jurisdiction scenario and detect conflicts.
    CrossBorder(CrossBorderArgs),

    /// Compute node and edge positions for rendering.
    Layout(LayoutArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_format);

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "droit starting");

    let config = match DroitConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(EXIT_ERROR);
        }
    };
    let ctx = CliContext {
        config,
        output: cli.output,
    };

    let result = match cli.command {
        Commands::Validate(args) => run_validate(&args, &ctx),
        Commands::Inspect(args) => run_inspect(&args, &ctx),
        Commands::Evaluate(args) => run_evaluate(&args, &ctx),
        Commands::Partial(args) => run_partial(&args, &ctx),
        Commands::CrossBorder(args) => run_cross_border(&args, &ctx),
        Commands::Layout(args) => run_layout(&args, &ctx),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Logs go to stderr so stdout carries only command output.
fn init_tracing(verbose: u8, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        })
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}
