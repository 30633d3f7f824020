//! busway CLI: run bus-bridge scenarios on the cycle-stepped simulator.
//!
//! Provides `busway run` to build a scenario's topology and drive its scripted
//! transactions to completion, and `busway check` to validate a scenario file
//! and show the port parameters it resolves to.

#![warn(missing_docs)]

mod check;
mod report;
mod run;
mod scenario;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

/// busway: AXI4, AXI4-Lite and Wishbone bridge simulator.
#[derive(Parser, Debug)]
#[command(name = "busway", version, about = "Cycle-stepped bus-bridge simulator")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Simulate a scenario to completion.
    Run(RunArgs),
    /// Validate a scenario without simulating it.
    Check(CheckArgs),
}

/// Arguments for the `busway run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Scenario file, or a directory containing `busway.toml`.
    pub scenario: PathBuf,

    /// Write a VCD waveform of every bus to this path.
    #[arg(long)]
    pub vcd: Option<PathBuf>,

    /// Output format for the transaction report.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Override the scenario's cycle budget.
    #[arg(long)]
    pub max_cycles: Option<u64>,

    /// Exit with status 1 if any transaction ends in an error response.
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the `busway check` subcommand.
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Scenario file, or a directory containing `busway.toml`.
    pub scenario: PathBuf,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from terminal capabilities.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Report output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Whether to use colored output.
    pub color: bool,
}

impl GlobalArgs {
    /// The log filter used when `RUST_LOG` is unset.
    fn default_filter(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose {
            "debug"
        } else {
            "warn"
        }
    }
}

fn init_tracing(global: &GlobalArgs) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(global.default_filter()));
    // A subscriber may already be installed when embedded; keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(global.color)
        .try_init();
}

fn main() {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => std::io::stderr().is_terminal(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
    };
    init_tracing(&global);

    let result = match cli.command {
        Command::Run(ref args) => run::run(args, &global),
        Command::Check(ref args) => check::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
