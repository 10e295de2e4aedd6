//! bpif CLI binary.
//!
//! Builds optimal portfolios, efficient frontiers and per-fund risk metrics
//! from a CSV or JSON fund report.

mod cmd;
mod data;

use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bpif")]
#[command(about = "Portfolio construction for Russian exchange-traded funds", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the minimum-variance, maximum-Sharpe, equal-weight and high-return portfolios
    Optimize {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Trace the efficient frontier
    Frontier {
        #[command(flatten)]
        input: InputArgs,

        /// Number of target returns on the frontier
        #[arg(short, long)]
        points: Option<usize>,
    },

    /// Show per-fund risk metrics ranked by Sharpe ratio
    Metrics {
        #[command(flatten)]
        input: InputArgs,
    },
}

/// Options shared by every subcommand.
#[derive(Args, Debug)]
struct InputArgs {
    /// Fund report (.csv or .json)
    input: PathBuf,

    /// Keep only the best N funds by Sharpe ratio
    #[arg(short, long)]
    top: Option<usize>,

    /// JSON optimizer configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Annual risk-free rate in percent
    #[arg(long)]
    risk_free_rate: Option<f64>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// How results are printed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable tables
    Text,
    /// Pretty-printed JSON
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Optimize { input } => cmd::optimize::run_optimize(&input),
        Commands::Frontier { input, points } => cmd::frontier::run_frontier(&input, points),
        Commands::Metrics { input } => cmd::metrics::run_metrics(&input),
    }
}
