//! Table loading: byte decode, header-row detection, headered re-slice.
//!
//! Uploaded lead files carry dashboard preamble rows above the real header,
//! so the loader first reads the input as a headerless grid, scans for the
//! marker substring that identifies the header row, and only then builds the
//! headered table from the rows below it.

use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use calamine::{Data, Reader, open_workbook_auto_from_rs};
use tracing::debug;

use crate::table::{Cell, RawTable};

/// Rows scanned for the header marker before giving up.
const HEADER_SCAN_ROWS: usize = 20;

/// Substring identifying the real header row, matched against the
/// uppercased, space-joined cell text of each scanned row.
const HEADER_MARKER: &str = "TARGET PREMIUM";

/// Input format, chosen by the caller from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Workbook,
}

impl TableFormat {
    /// Picks the format from a file name; workbook extensions win, anything
    /// else is treated as delimited text.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext)
                if ext.eq_ignore_ascii_case("xlsx")
                    || ext.eq_ignore_ascii_case("xlsm")
                    || ext.eq_ignore_ascii_case("xls") =>
            {
                TableFormat::Workbook
            }
            _ => TableFormat::Csv,
        }
    }
}

/// Decodes raw bytes into a [`RawTable`] with its header row resolved.
///
/// # Errors
///
/// Returns an error when the bytes cannot be decoded as the given format or
/// the input contains no rows at all. The caller halts the run for that
/// input; no partial table is produced.
pub fn load_table(bytes: &[u8], format: TableFormat) -> Result<RawTable> {
    let grid = match format {
        TableFormat::Csv => csv_grid(bytes)?,
        TableFormat::Workbook => workbook_grid(bytes)?,
    };

    if grid.is_empty() {
        bail!("input contains no rows");
    }

    let header_row = detect_header_row(&grid);
    debug!(header_row, total_rows = grid.len(), "header row resolved");

    Ok(table_from(grid, header_row))
}

/// Scans the first [`HEADER_SCAN_ROWS`] rows for [`HEADER_MARKER`]; the
/// first matching row wins, and no match defaults to row 0.
fn detect_header_row(grid: &[Vec<Cell>]) -> usize {
    grid.iter()
        .take(HEADER_SCAN_ROWS)
        .position(|row| {
            let joined = row
                .iter()
                .map(|cell| cell.text().to_uppercase())
                .collect::<Vec<_>>()
                .join(" ");
            joined.contains(HEADER_MARKER)
        })
        .unwrap_or(0)
}

/// Builds the headered table: the header row's cells become column names
/// and every later row is padded or truncated to header width.
fn table_from(mut grid: Vec<Vec<Cell>>, header_row: usize) -> RawTable {
    let data = grid.split_off(header_row + 1);
    let header_cells = grid.pop().unwrap_or_default();

    let headers: Vec<String> = header_cells
        .iter()
        .map(|cell| cell.text().trim().to_string())
        .collect();

    let width = headers.len();
    let rows = data
        .into_iter()
        .map(|mut row| {
            row.resize(width, Cell::Empty);
            row
        })
        .collect();

    RawTable {
        header_row,
        headers,
        rows,
    }
}

fn csv_grid(bytes: &[u8]) -> Result<Vec<Vec<Cell>>> {
    let text = String::from_utf8_lossy(bytes);
    // strip UTF-8 BOM
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);

    let delimiter = sniff_delimiter(text);
    debug!(delimiter = %(delimiter as char), "delimiter sniffed");

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let mut grid = Vec::new();
    for record in reader.records() {
        let record = record.context("malformed delimited row")?;
        grid.push(record.iter().map(Cell::from_csv_field).collect());
    }

    Ok(grid)
}

/// Counts candidate delimiter bytes over the first lines and picks the most
/// frequent; a file with no candidate at all falls back to a comma.
fn sniff_delimiter(text: &str) -> u8 {
    const CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];

    let sample = text.lines().take(10).collect::<Vec<_>>().join("\n");

    let mut best = b',';
    let mut best_count = 0;
    for candidate in CANDIDATES {
        let count = sample.bytes().filter(|b| *b == candidate).count();
        if count > best_count {
            best = candidate;
            best_count = count;
        }
    }
    best
}

fn workbook_grid(bytes: &[u8]) -> Result<Vec<Vec<Cell>>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .context("failed to open workbook")?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| anyhow!("workbook has no sheets"))?
        .context("failed to read first sheet")?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect())
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Text(format!("{e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csv_with_marker_at(row: usize) -> String {
        let mut lines: Vec<String> = (0..row)
            .map(|i| format!("preamble {i},junk,junk"))
            .collect();
        lines.push("LEAD ID,SOURCE,TARGET PREMIUM".to_string());
        lines.push("LD-001,Facebook,1000".to_string());
        lines.join("\n")
    }

    #[test]
    fn test_marker_in_row_7_resolves_header_row_7() {
        let input = csv_with_marker_at(7);
        let table = load_table(input.as_bytes(), TableFormat::Csv).unwrap();

        assert_eq!(table.header_row, 7);
        assert_eq!(
            table.headers,
            vec!["LEAD ID", "SOURCE", "TARGET PREMIUM"]
        );
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn test_no_marker_defaults_to_row_0() {
        let input = "a,b,c\n1,2,3\n";
        let table = load_table(input.as_bytes(), TableFormat::Csv).unwrap();

        assert_eq!(table.header_row, 0);
        assert_eq!(table.headers, vec!["a", "b", "c"]);
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn test_marker_beyond_scan_window_is_ignored() {
        let input = csv_with_marker_at(25);
        let table = load_table(input.as_bytes(), TableFormat::Csv).unwrap();

        assert_eq!(table.header_row, 0);
    }

    #[test]
    fn test_marker_is_case_insensitive() {
        let input = "title,,\nlead id,source,target premium\nLD-1,cc,5\n";
        let table = load_table(input.as_bytes(), TableFormat::Csv).unwrap();

        assert_eq!(table.header_row, 1);
    }

    #[test]
    fn test_marker_spanning_two_cells_matches() {
        // joined row text is "X TARGET PREMIUM", matching across the cell gap
        let input = "report,export,junk\nx,target,premium\nd1,d2,d3\n";
        let table = load_table(input.as_bytes(), TableFormat::Csv).unwrap();

        assert_eq!(table.header_row, 1);
        assert_eq!(table.headers, vec!["x", "target", "premium"]);
    }

    #[test]
    fn test_short_rows_are_padded_to_header_width() {
        let input = "TARGET PREMIUM,SOURCE,LEAD ID\n100,cc\n";
        let table = load_table(input.as_bytes(), TableFormat::Csv).unwrap();

        assert_eq!(table.rows[0].len(), 3);
        assert_eq!(table.rows[0][2], Cell::Empty);
    }

    #[test]
    fn test_semicolon_delimiter_is_sniffed() {
        let input = "TARGET PREMIUM;SOURCE\n100;cc\n200;fb\n";
        let table = load_table(input.as_bytes(), TableFormat::Csv).unwrap();

        assert_eq!(table.headers, vec!["TARGET PREMIUM", "SOURCE"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][0], Cell::Number(100.0));
    }

    #[test]
    fn test_quoted_field_with_embedded_comma() {
        let input = "TARGET PREMIUM,SOURCE\n\"$1,234.56\",fb\n";
        let table = load_table(input.as_bytes(), TableFormat::Csv).unwrap();

        assert_eq!(table.rows[0][0], Cell::Text("$1,234.56".to_string()));
    }

    #[test]
    fn test_empty_input_is_a_load_fault() {
        assert!(load_table(b"", TableFormat::Csv).is_err());
    }

    #[test]
    fn test_garbage_workbook_bytes_are_a_load_fault() {
        assert!(load_table(b"not a workbook", TableFormat::Workbook).is_err());
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            TableFormat::from_path(Path::new("leads.XLSX")),
            TableFormat::Workbook
        );
        assert_eq!(
            TableFormat::from_path(Path::new("leads.csv")),
            TableFormat::Csv
        );
        assert_eq!(
            TableFormat::from_path(Path::new("leads")),
            TableFormat::Csv
        );
    }

    #[test]
    fn test_workbook_round_trip_with_preamble() {
        use rust_xlsxwriter::Workbook;

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Masterlife export").unwrap();
        sheet.write_string(2, 0, "LEAD ID").unwrap();
        sheet.write_string(2, 1, "TARGET PREMIUM").unwrap();
        sheet.write_string(3, 0, "LD-001").unwrap();
        sheet.write_number(3, 1, 1500.0).unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let table = load_table(&bytes, TableFormat::Workbook).unwrap();

        assert_eq!(table.header_row, 2);
        assert_eq!(table.headers, vec!["LEAD ID", "TARGET PREMIUM"]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0][1], Cell::Number(1500.0));
    }
}
