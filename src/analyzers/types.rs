//! Data types produced by the enrichment pipeline.

use serde::Serialize;

use crate::analyzers::cohort::CohortLabel;
use crate::table::Cell;

/// A table row augmented with the derived pipeline fields.
#[derive(Debug)]
pub struct EnrichedRow {
    /// Original cells, padded to header width.
    pub cells: Vec<Cell>,
    /// Normalized revenue, always >= 0.
    pub revenue: f64,
    pub cohort: CohortLabel,
    /// Close month in 1..=12 when the cell parsed to one; `None` keeps the
    /// row out of the matrices but not out of the exported table.
    pub close_month: Option<u32>,
    /// Trimmed record identifier; `None` when blank or unresolved.
    pub record_id: Option<String>,
}

/// Headline scalars handed to the presentation layer.
#[derive(Debug, Serialize)]
pub struct ReportSummary {
    pub current_year: i32,
    pub total_rows: usize,
    /// Revenue over every row, with or without a close month.
    pub total_revenue: f64,
    /// Revenue over temporal cohorts only; cold-call and unclassified rows
    /// are excluded.
    pub marketing_revenue: f64,
    /// Distinct non-blank record ids across the whole table.
    pub distinct_records: usize,
    /// Revenue per close month, the input series for the monthly trend.
    pub monthly_revenue: [f64; 12],
}
