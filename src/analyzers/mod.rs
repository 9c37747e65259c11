//! The analysis engine: per-row enrichment, cohort classification, and
//! month-by-cohort aggregation.
//!
//! This is the pipeline between a loaded [`crate::table::RawTable`] and the
//! report workbook: every row gets a normalized revenue and a cohort, then
//! the rows fold into a revenue-sum matrix and a distinct-count matrix.

pub mod cohort;
pub mod enrich;
pub mod matrix;
pub mod revenue;
pub mod types;
