//! Month-by-cohort aggregation matrices.

use std::collections::HashSet;

use crate::analyzers::cohort::CohortLabel;
use crate::analyzers::types::EnrichedRow;

/// Number of month columns every matrix row materializes.
pub const MONTHS: usize = 12;

/// Display labels for the month columns, `Month 1` .. `Month 12`.
pub fn month_columns() -> Vec<String> {
    (1..=MONTHS).map(|m| format!("Month {m}")).collect()
}

/// An aggregation matrix: one row per observed cohort, twelve zero-filled
/// month columns, rows already in canonical display order.
#[derive(Debug, PartialEq)]
pub struct CohortMatrix<T> {
    pub rows: Vec<(CohortLabel, [T; MONTHS])>,
}

/// Sums revenue per (cohort, close month) cell.
pub fn revenue_matrix(rows: &[EnrichedRow]) -> CohortMatrix<f64> {
    let matrix_rows = observed_labels(rows)
        .into_iter()
        .map(|label| {
            let mut cells = [0.0; MONTHS];
            for row in rows.iter().filter(|r| r.cohort == label) {
                if let Some(month) = row.close_month {
                    cells[month as usize - 1] += row.revenue;
                }
            }
            (label, cells)
        })
        .collect();

    CohortMatrix { rows: matrix_rows }
}

/// Counts distinct record ids per (cohort, close month) cell.
///
/// Duplicate ids within a cell collapse to one; rows without an id
/// contribute nothing to the counts.
pub fn count_matrix(rows: &[EnrichedRow]) -> CohortMatrix<u64> {
    let matrix_rows = observed_labels(rows)
        .into_iter()
        .map(|label| {
            let mut cells = [0u64; MONTHS];
            for (idx, cell) in cells.iter_mut().enumerate() {
                let month = (idx + 1) as u32;
                let distinct: HashSet<&str> = rows
                    .iter()
                    .filter(|r| r.cohort == label && r.close_month == Some(month))
                    .filter_map(|r| r.record_id.as_deref())
                    .collect();
                *cell = distinct.len() as u64;
            }
            (label, cells)
        })
        .collect();

    CohortMatrix { rows: matrix_rows }
}

/// Distinct labels observed anywhere in the input, in display order.
///
/// A label whose rows all lack a close month still gets a matrix row; its
/// cells just stay zero.
fn observed_labels(rows: &[EnrichedRow]) -> Vec<CohortLabel> {
    let mut labels: Vec<CohortLabel> = Vec::new();
    for row in rows {
        if !labels.contains(&row.cohort) {
            labels.push(row.cohort.clone());
        }
    }
    labels.sort_by_key(|l| l.sort_key());
    labels
}
