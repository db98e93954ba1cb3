mod commands;
mod input;
mod logger;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::metrics::MetricsArgs;
use commands::simulate::SimulateArgs;

/// Investment waterfall simulations for subsidised EV-charging deployments
#[derive(Parser)]
#[command(
    name = "evw",
    version,
    about = "Investment waterfall simulations for EV-charging deployments",
    long_about = "Simulates month by month how operating profit from a subsidised \
                  EV-charging deployment is split between an external investor and \
                  the operating company across interest, profit-share, amortizing \
                  and exclusive phases, then reports NPV, IRR and ROI for both."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a waterfall simulation from a scenario file, a preset, stdin or flags
    Simulate(SimulateArgs),
    /// Calculate NPV, IRR and ROI for a monthly cash-flow series
    Metrics(MetricsArgs),
    /// List the built-in scenario presets
    Presets,
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logger::init() {
        eprintln!("{}: {}", "error".red().bold(), e);
        process::exit(1);
    }

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Simulate(args) => commands::simulate::run_simulate(args),
        Commands::Metrics(args) => commands::metrics::run_metrics(args),
        Commands::Presets => commands::simulate::list_presets(),
        Commands::Version => {
            println!("evw {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
