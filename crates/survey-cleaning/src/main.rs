//! CLI entry point for the student survey cleaning pipeline.

use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use serde_json::json;
use std::path::{Path, PathBuf};
use survey_cleaning::reporting::CleaningReport;
use survey_cleaning::{CleaningConfig, CleaningError, CleaningPipeline, DatasetStatistics};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Student survey data cleaning pipeline",
    long_about = "Cleans a raw student survey export and writes the result as CSV and XLSX.\n\n\
                  EXAMPLES:\n  \
                  # Default paths\n  \
                  survey-cleaning\n\n  \
                  # Custom input and outputs\n  \
                  survey-cleaning -i responses.csv --output-csv out/clean.csv --output-xlsx out/clean.xlsx\n\n  \
                  # Override mapping tables and bounds\n  \
                  survey-cleaning -c cleaning.json"
)]
struct Args {
    /// Path to the raw survey export
    #[arg(short, long, default_value = "data/raw/forms_responses_12955.csv")]
    input: PathBuf,

    /// Where to write the cleaned CSV
    #[arg(long, default_value = "data/cleaned/cleaned_student_data.csv")]
    output_csv: PathBuf,

    /// Where to write the cleaned XLSX workbook
    #[arg(long, default_value = "data/cleaned/cleaned_student_data.xlsx")]
    output_xlsx: PathBuf,

    /// JSON file overriding mapping tables, bounds and defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,

    /// Output the JSON report to stdout instead of a human-readable summary
    ///
    /// Disables all logging so stdout only carries JSON.
    #[arg(long)]
    json: bool,

    /// Write the JSON report (summary and statistics) to this path
    #[arg(short = 'r', long)]
    emit_report: Option<PathBuf>,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    // .env may carry RUST_LOG
    dotenv().ok();
    init_logging(&args.log_level, args.quiet, args.json);

    if let Err(e) = run(&args) {
        report_failure(&args, &e);
        std::process::exit(1);
    }
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            CleaningConfig::from_json_file(path)?
        }
        None => CleaningConfig::default(),
    };

    let pipeline = CleaningPipeline::builder()
        .config(config)
        .build()
        .context("Invalid cleaning configuration")?;

    let (result, statistics) = pipeline.run(&args.input, &args.output_csv, &args.output_xlsx)?;

    let report = CleaningReport::new(
        &args.input,
        &args.output_csv,
        &args.output_xlsx,
        result.summary,
        statistics,
    );

    if let Some(path) = &args.emit_report {
        report.write_to_file(path)?;
    }

    if args.json {
        println!("{}", report.to_json()?);
    } else {
        print_completion(&report.statistics);
    }
    Ok(())
}

/// User-facing success message.
///
/// Uses `println!` so it shows regardless of log level.
fn print_completion(stats: &DatasetStatistics) {
    println!();
    println!("Data cleaning completed successfully!");
    println!(
        "Final dataset: {} records ready for analysis",
        stats.record_count
    );
}

fn report_failure(args: &Args, error: &anyhow::Error) {
    if args.json {
        let body = match error.downcast_ref::<CleaningError>() {
            Some(e) => json!({ "error": e }),
            None => json!({ "error": { "code": "CLI_ERROR", "message": format!("{:#}", error) } }),
        };
        println!("{}", body);
        return;
    }

    for line in failure_lines(&args.input, error) {
        eprintln!("{}", line);
    }
}

/// Human-readable failure message.
///
/// A missing input gets the actionable hint even when wrapped in context.
fn failure_lines(input: &Path, error: &anyhow::Error) -> [String; 2] {
    let input_missing = error
        .downcast_ref::<CleaningError>()
        .is_some_and(CleaningError::is_input_not_found);

    if input_missing {
        [
            format!("Error: Input file not found at {}", input.display()),
            "Please ensure the raw data file exists in the data/raw/ directory.".to_string(),
        ]
    } else {
        [
            format!("Error during data cleaning: {:#}", error),
            "Please check the input data format and try again.".to_string(),
        ]
    }
}
