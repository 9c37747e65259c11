//! CLI entry point for the lead cohort report tool.
//!
//! Provides subcommands for building the month-by-cohort report workbook
//! from an uploaded lead file and for inspecting how a file's header row
//! and semantic columns resolve.

use anyhow::{Context, Result};
use chrono::Datelike;
use clap::{Parser, Subcommand};
use lead_cohort_report::analyzers::enrich::{enrich_rows, summarize};
use lead_cohort_report::analyzers::matrix::{count_matrix, revenue_matrix};
use lead_cohort_report::columns::ColumnMap;
use lead_cohort_report::loader::{TableFormat, load_table};
use lead_cohort_report::output::{print_json, write_workbook};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "lead_cohort_report")]
#[command(about = "Builds month-by-cohort revenue reports from lead files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the report workbook from a CSV or Excel lead file
    Report {
        /// Path to the lead file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Path for the .xlsx report (default: lead_cohort_report_{year}.xlsx)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Calendar year splitting current from prior lead cohorts
        /// (default: this year)
        #[arg(short, long)]
        year: Option<i32>,
    },
    /// Show how a file's header row and semantic columns resolve
    Inspect {
        /// Path to the lead file
        #[arg(value_name = "INPUT")]
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/lead_cohort_report.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("lead_cohort_report.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Report {
            input,
            output,
            year,
        } => {
            let year = year.unwrap_or_else(|| chrono::Local::now().year());
            let output =
                output.unwrap_or_else(|| PathBuf::from(format!("lead_cohort_report_{year}.xlsx")));
            run_report(&input, &output, year)?;
        }
        Commands::Inspect { input } => {
            inspect(&input)?;
        }
    }

    Ok(())
}

/// Runs the full pipeline: load, resolve columns, enrich, aggregate, write
/// the workbook, and print the summary scalars as JSON.
#[tracing::instrument(skip(input, output), fields(input = %input.display(), output = %output.display()))]
fn run_report(input: &Path, output: &Path, year: i32) -> Result<()> {
    let bytes = std::fs::read(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let table = load_table(&bytes, TableFormat::from_path(input))
        .context("no usable table in input")?;
    info!(
        rows = table.rows.len(),
        header_row = table.header_row,
        "table loaded"
    );

    let columns = ColumnMap::resolve(&table.headers);
    let rows = enrich_rows(&table, &columns, year);
    let summary = summarize(&rows, year);
    let revenue = revenue_matrix(&rows);
    let counts = count_matrix(&rows);

    write_workbook(output, &table.headers, &rows, &revenue, &counts)?;
    print_json(&summary)
}

/// Loads the file and prints the detected header row and role resolution.
fn inspect(input: &Path) -> Result<()> {
    let bytes = std::fs::read(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let table = load_table(&bytes, TableFormat::from_path(input))
        .context("no usable table in input")?;
    let columns = ColumnMap::resolve(&table.headers);

    let header_at = |idx: Option<usize>| idx.map(|i| table.headers[i].clone());
    let report = serde_json::json!({
        "header_row": table.header_row,
        "headers": table.headers.clone(),
        "roles": {
            "revenue_amount": header_at(columns.revenue),
            "close_month": header_at(columns.close_month),
            "lead_month": header_at(columns.lead_month),
            "lead_year": header_at(columns.lead_year),
            "record_id": header_at(columns.record_id),
            "source_channel": header_at(columns.source_channel),
        },
        "unresolved_roles": columns.unresolved_roles(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
