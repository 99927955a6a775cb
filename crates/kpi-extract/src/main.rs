//! CLI entry point for the KPI extraction pipeline.

use anyhow::{Context, Result};
use clap::Parser;
use kpi_extract::{
    ExtractionConfig, ExtractionConfigBuilder, InvalidValuePolicy, JsonReport, Pipeline,
    SheetSelector, render_console_report,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Monthly KPI extractor",
    long_about = "Extracts the June-October KPI block from a spreadsheet, fills missing values \
                  with the column mean and writes a tidy CSV.\n\n\
                  EXAMPLES:\n  \
                  # Default workbook and output\n  \
                  kpi-extract\n\n  \
                  # Explicit paths\n  \
                  kpi-extract -i export.xlsx -o out/kpi.csv\n\n  \
                  # Fail on values that are neither numbers nor the sentinel\n  \
                  kpi-extract --strict\n\n  \
                  # Machine-readable output\n  \
                  kpi-extract --json | jq .columns"
)]
struct Args {
    /// Path to the source workbook
    ///
    /// Defaults to "Данные для хакатона.xlsx"
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Path of the CSV to write
    ///
    /// Defaults to "kpi.csv"
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON configuration file; flags given on the command line override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Read the sheet with this name instead of the first one
    #[arg(long, conflicts_with = "sheet_index")]
    sheet: Option<String>,

    /// Read the sheet at this zero-based position instead of the first one
    #[arg(long)]
    sheet_index: Option<usize>,

    /// Zero-based position of the first KPI column
    #[arg(long)]
    first_column: Option<usize>,

    /// Number of leading rows holding column labels
    #[arg(long)]
    label_rows: Option<usize>,

    /// Cell text marking an absent measurement
    #[arg(long)]
    sentinel: Option<String>,

    /// Abort on values that are neither numeric nor the sentinel
    #[arg(long)]
    strict: bool,

    /// Number of rows shown in the preview
    #[arg(long)]
    preview_rows: Option<usize>,

    /// Compute and report without writing the CSV
    #[arg(long)]
    no_write: bool,

    /// Write the CSV in place instead of through a temporary file
    #[arg(long)]
    no_atomic: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings, errors and the report)
    #[arg(short, long)]
    quiet: bool,

    /// Output JSON to stdout instead of the human-readable report
    ///
    /// Disables all logging; only the final JSON document is printed.
    #[arg(long)]
    json: bool,
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
        .with_writer(std::io::stderr)
        .init();
}

/// Layer command-line flags over the config file (or the defaults).
fn build_config(args: &Args) -> Result<ExtractionConfig> {
    let base = match &args.config {
        Some(path) => ExtractionConfig::from_json_file(path)
            .with_context(|| format!("Loading configuration from {}", path.display()))?,
        None => ExtractionConfig::default(),
    };

    let mut builder = ExtractionConfigBuilder::from_config(base);

    if let Some(input) = &args.input {
        builder = builder.source_path(input);
    }
    if let Some(output) = &args.output {
        builder = builder.output_path(output);
    }
    if let Some(name) = &args.sheet {
        builder = builder.sheet(SheetSelector::Name(name.clone()));
    }
    if let Some(index) = args.sheet_index {
        builder = builder.sheet(SheetSelector::Index(index));
    }
    if let Some(column) = args.first_column {
        builder = builder.first_column(column);
    }
    if let Some(rows) = args.label_rows {
        builder = builder.label_rows(rows);
    }
    if let Some(sentinel) = &args.sentinel {
        builder = builder.sentinel(sentinel);
    }
    if args.strict {
        builder = builder.invalid_value_policy(InvalidValuePolicy::Reject);
    }
    if let Some(rows) = args.preview_rows {
        builder = builder.preview_rows(rows);
    }
    if args.no_write {
        builder = builder.write_output(false);
    }
    if args.no_atomic {
        builder = builder.atomic_write(false);
    }

    Ok(builder.build()?)
}

fn run(args: &Args) -> Result<()> {
    let config = build_config(args)?;
    debug!("Effective configuration: {:?}", config);

    let preview_rows = config.preview_rows;
    let pipeline = Pipeline::builder().config(config).build()?;

    match pipeline.run() {
        Ok(result) => {
            if args.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&JsonReport::from_result(&result))?
                );
            } else {
                println!("{}", render_console_report(&result, preview_rows));
            }
            Ok(())
        }
        Err(e) if args.json => {
            println!("{}", serde_json::json!({ "error": e }));
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if !args.json {
                eprintln!("Error: {:#}", e);
            }
            ExitCode::FAILURE
        }
    }
}
