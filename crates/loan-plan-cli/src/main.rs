mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use log::LevelFilter;
use std::io::Write;
use std::process;

use commands::plan::{ComputeArgs, PlanArgs};

/// Repayment plans for multi-phase loans
#[derive(Parser)]
#[command(
    name = "loanplan",
    version,
    about = "Compute repayment plans for loans with successive rate phases",
    long_about = "Computes the monthly repayment plan of a loan defined as a sequence of \
                  rate phases (fixed then variable rate, early repayments, payment \
                  adjustments, insurance), checks it for coherence and writes it back \
                  into the loan definition file."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Enable verbose mode (debug logging)
    #[arg(long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a repayment plan from a loan definition FILE and save it when coherent
    Compute(ComputeArgs),
    /// Compute and print a repayment plan without saving anything
    Plan(PlanArgs),
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

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| writeln!(buf, "{} {}", record.level(), record.args()))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Compute(args) => commands::plan::run_compute(args),
        Commands::Plan(args) => commands::plan::run_plan(args),
        Commands::Version => {
            println!("loanplan {}", env!("CARGO_PKG_VERSION"));
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
