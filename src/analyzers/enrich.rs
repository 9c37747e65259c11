//! Per-row enrichment: one pass over the table applying revenue
//! normalization and cohort classification with the resolved columns.

use std::collections::HashSet;

use tracing::warn;

use crate::analyzers::cohort;
use crate::analyzers::revenue::normalize_revenue;
use crate::analyzers::types::{EnrichedRow, ReportSummary};
use crate::columns::ColumnMap;
use crate::table::RawTable;

/// Runs the per-row stages over the whole table.
///
/// Row-level faults never abort the batch: unparseable temporal fields fall
/// to [`cohort::CohortLabel::Unclassified`] and unparseable amounts to zero
/// revenue. Unresolved roles degrade every row the same way and are warned
/// about once up front.
pub fn enrich_rows(table: &RawTable, columns: &ColumnMap, current_year: i32) -> Vec<EnrichedRow> {
    for role in columns.unresolved_roles() {
        warn!(role, "no column matched; values degrade to defaults");
    }

    table
        .rows
        .iter()
        .map(|row| {
            let cell = |idx: Option<usize>| idx.and_then(|i| row.get(i));

            let revenue = match cell(columns.revenue) {
                Some(c) if !c.is_empty() => normalize_revenue(&c.text()),
                _ => 0.0,
            };

            let cohort = cohort::classify(
                cell(columns.source_channel),
                cell(columns.lead_year),
                cell(columns.lead_month),
                current_year,
            );

            let close_month = cohort::close_month(cell(columns.close_month));

            let record_id = cell(columns.record_id).and_then(|c| {
                let id = c.text().trim().to_string();
                (!id.is_empty()).then_some(id)
            });

            EnrichedRow {
                cells: row.clone(),
                revenue,
                cohort,
                close_month,
                record_id,
            }
        })
        .collect()
}

/// Computes the headline scalars over the enriched rows.
pub fn summarize(rows: &[EnrichedRow], current_year: i32) -> ReportSummary {
    let mut monthly_revenue = [0.0; 12];
    let mut distinct: HashSet<&str> = HashSet::new();
    let mut total_revenue = 0.0;
    let mut marketing_revenue = 0.0;

    for row in rows {
        total_revenue += row.revenue;
        if row.cohort.is_marketing() {
            marketing_revenue += row.revenue;
        }
        if let Some(month) = row.close_month {
            monthly_revenue[month as usize - 1] += row.revenue;
        }
        if let Some(id) = &row.record_id {
            distinct.insert(id);
        }
    }

    ReportSummary {
        current_year,
        total_rows: rows.len(),
        total_revenue,
        marketing_revenue,
        distinct_records: distinct.len(),
        monthly_revenue,
    }
}
