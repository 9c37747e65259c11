//! Report assembly: the three-sheet workbook and the JSON summary surface.

use anyhow::Result;
use rust_xlsxwriter::{Workbook, Worksheet};
use tracing::{debug, info};

use crate::analyzers::matrix::{CohortMatrix, month_columns};
use crate::analyzers::types::{EnrichedRow, ReportSummary};
use crate::table::Cell;

/// Sheet names, in workbook order.
pub const REVENUE_SHEET: &str = "Summary_Cohort";
pub const COUNT_SHEET: &str = "Count_Cohort";
pub const DATA_SHEET: &str = "Full_Clean_Data";

/// Builds the three-sheet report workbook and serializes it to bytes.
///
/// Sheet order and cell values are the contract here; number formats and
/// highlighting are left to whatever opens the file.
pub fn workbook_bytes(
    headers: &[String],
    rows: &[EnrichedRow],
    revenue: &CohortMatrix<f64>,
    counts: &CohortMatrix<u64>,
) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet();
    sheet.set_name(REVENUE_SHEET)?;
    write_matrix(sheet, revenue, |v| v)?;

    let sheet = workbook.add_worksheet();
    sheet.set_name(COUNT_SHEET)?;
    write_matrix(sheet, counts, |v| v as f64)?;

    let sheet = workbook.add_worksheet();
    sheet.set_name(DATA_SHEET)?;
    write_full_data(sheet, headers, rows)?;

    let bytes = workbook.save_to_buffer()?;
    debug!(size = bytes.len(), "workbook serialized");
    Ok(bytes)
}

/// Writes the workbook to a file path.
pub fn write_workbook(
    path: &std::path::Path,
    headers: &[String],
    rows: &[EnrichedRow],
    revenue: &CohortMatrix<f64>,
    counts: &CohortMatrix<u64>,
) -> Result<()> {
    let bytes = workbook_bytes(headers, rows, revenue, counts)?;
    std::fs::write(path, &bytes)?;
    info!(path = %path.display(), size = bytes.len(), "report written");
    Ok(())
}

/// Prints the summary scalars as pretty JSON on stdout.
pub fn print_json(summary: &ReportSummary) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(summary)?);
    Ok(())
}

fn write_matrix<T: Copy>(
    sheet: &mut Worksheet,
    matrix: &CohortMatrix<T>,
    to_number: impl Fn(T) -> f64,
) -> Result<()> {
    sheet.write_string(0, 0, "Cohort")?;
    for (col, name) in month_columns().iter().enumerate() {
        sheet.write_string(0, (col + 1) as u16, name)?;
    }

    for (idx, (label, cells)) in matrix.rows.iter().enumerate() {
        let row = (idx + 1) as u32;
        sheet.write_string(row, 0, label.to_string())?;
        for (col, value) in cells.iter().enumerate() {
            sheet.write_number(row, (col + 1) as u16, to_number(*value))?;
        }
    }

    Ok(())
}

/// The full enriched table: every original column plus the two derived
/// ones, with cells keeping their native types.
fn write_full_data(sheet: &mut Worksheet, headers: &[String], rows: &[EnrichedRow]) -> Result<()> {
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string(0, col as u16, header)?;
    }
    let derived_base = headers.len() as u16;
    sheet.write_string(0, derived_base, "revenue")?;
    sheet.write_string(0, derived_base + 1, "cohort")?;

    for (idx, row) in rows.iter().enumerate() {
        let out_row = (idx + 1) as u32;
        for (col, cell) in row.cells.iter().enumerate() {
            write_cell(sheet, out_row, col as u16, cell)?;
        }
        sheet.write_number(out_row, derived_base, row.revenue)?;
        sheet.write_string(out_row, derived_base + 1, row.cohort.to_string())?;
    }

    Ok(())
}

fn write_cell(sheet: &mut Worksheet, row: u32, col: u16, cell: &Cell) -> Result<()> {
    match cell {
        Cell::Empty => {}
        Cell::Text(s) => {
            sheet.write_string(row, col, s)?;
        }
        Cell::Number(n) => {
            sheet.write_number(row, col, *n)?;
        }
        Cell::Bool(b) => {
            sheet.write_boolean(row, col, *b)?;
        }
    }
    Ok(())
}
