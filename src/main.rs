//! Callfreq CLI
//!
//! Builds a call-frequency tree from a file of textual stack traces and
//! writes it as collapsible HTML (or JSON).

use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use std::path::PathBuf;

use callfreq::commands::{execute_build, validate_args, BuildArgs, OutputFormat};
use callfreq::utils::config::{DEFAULT_MARKER, DEFAULT_OUTPUT};

/// Callfreq - call-frequency trees from profiler stack traces
#[derive(Parser, Debug)]
#[command(name = "callfreq")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Input file with stack traces
    #[arg(short, long, alias = "in")]
    input: PathBuf,

    /// Output document path
    #[arg(short, long, alias = "out", default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Output format (defaults to json for *.json outputs, html otherwise)
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Character that starts a frame line
    #[arg(long, env = "CALLFREQ_MARKER", default_value_t = DEFAULT_MARKER)]
    marker: char,

    /// Treat a final trace without a trailing separator as a root
    #[arg(long)]
    flush_trailing: bool,

    /// Print text summary to stdout
    #[arg(long)]
    summary: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let args = BuildArgs {
        input: cli.input,
        output: cli.output,
        format: cli.format,
        marker: cli.marker,
        flush_trailing: cli.flush_trailing,
        print_summary: cli.summary,
    };

    // Validate args first
    validate_args(&args)?;

    execute_build(args)?;

    Ok(())
}
