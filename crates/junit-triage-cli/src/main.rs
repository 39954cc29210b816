//! junit-triage CLI - Root-cause triage for failing JUnit test cases

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use junit_triage_core::{JunitReport, SelectionRules};

#[derive(Parser)]
#[command(name = "junit-triage")]
#[command(about = "Classify failing JUnit test cases by root cause")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, global = true, default_value = "terminal")]
    output: OutputFormat,

    /// Verbose logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a JUnit XML report and print the root cause of each failure
    Parse {
        /// The input file to parse
        #[arg(short, long)]
        file_path: PathBuf,
    },

    /// Export JSON Schema for the `--output json` format
    Schema,
}

#[derive(Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OutputFormat {
    Terminal,
    Json,
    Silent,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(3)
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Parse { file_path } => {
            let report = JunitReport::load(&file_path)
                .with_context(|| format!("failed to load {}", file_path.display()))?;
            let triage = report.triage(&SelectionRules::default());

            match cli.output {
                OutputFormat::Terminal => println!("{}", triage.to_terminal()),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&triage)?),
                OutputFormat::Silent => {}
            }
            Ok(())
        }

        Commands::Schema => {
            let schema = junit_triage_core::schema::generate_schema();
            println!("{schema}");
            Ok(())
        }
    }
}
