//! Spreadsheet reading for bulk imports
//!
//! Every supported format is flattened into header-keyed rows of strings.

use std::collections::HashMap;
use std::path::Path;
use calamine::{open_workbook_auto, Data, Reader};
use crate::utils::errors::{KarmaHubError, Result};

/// One data row keyed by its column header
pub type RawRow = HashMap<String, String>;

/// Rows read from a file together with the detected headers
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

/// Read a `.csv`, `.xlsx` or `.xls` file; spreadsheets use their first sheet
pub fn read_sheet(path: &Path) -> Result<Sheet> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "csv" => read_csv(path),
        "xlsx" | "xls" => read_workbook(path),
        other => Err(KarmaHubError::InvalidInput(format!(
            "Unsupported file format: .{}. Use .csv, .xlsx, or .xls",
            other
        ))),
    }
}

fn read_csv(path: &Path) -> Result<Sheet> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(csv_error)?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        rows.push(zip_row(&headers, record.iter().map(str::to_string)));
    }

    Ok(Sheet { headers, rows })
}

fn read_workbook(path: &Path) -> Result<Sheet> {
    let mut workbook = open_workbook_auto(path).map_err(spreadsheet_error)?;
    let first = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| KarmaHubError::InvalidInput("Workbook has no sheets".to_string()))?;
    let range = workbook.worksheet_range(&first).map_err(spreadsheet_error)?;

    let mut lines = range.rows();
    let headers: Vec<String> = match lines.next() {
        Some(header) => header.iter().map(cell_text).collect(),
        None => return Ok(Sheet::default()),
    };

    let rows = lines
        .filter(|cells| cells.iter().any(|c| !matches!(c, Data::Empty)))
        .map(|cells| zip_row(&headers, cells.iter().map(cell_text)))
        .collect();

    Ok(Sheet { headers, rows })
}

/// Render a cell as text the way a spreadsheet shows it
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string().trim().to_string(),
    }
}

fn zip_row(headers: &[String], cells: impl Iterator<Item = String>) -> RawRow {
    headers
        .iter()
        .cloned()
        .zip(cells)
        .filter(|(header, _)| !header.is_empty())
        .collect()
}

fn csv_error(e: csv::Error) -> KarmaHubError {
    KarmaHubError::InvalidInput(format!("Failed to read CSV: {}", e))
}

fn spreadsheet_error(e: impl std::fmt::Display) -> KarmaHubError {
    KarmaHubError::InvalidInput(format!("Failed to read spreadsheet: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_csv_trims_and_skips_blank_lines() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "Name , Email ID,Mobile Number").unwrap();
        writeln!(file, " Asha Rao , asha@college.edu , 98450 12345").unwrap();
        writeln!(file, ",,").unwrap();
        writeln!(file, "Ravi,ravi@college.edu,9000011111").unwrap();

        let sheet = read_sheet(file.path()).unwrap();
        assert_eq!(sheet.headers, vec!["Name", "Email ID", "Mobile Number"]);
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[0]["Name"], "Asha Rao");
        assert_eq!(sheet.rows[0]["Mobile Number"], "98450 12345");
    }

    #[test]
    fn test_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        let err = read_sheet(file.path()).unwrap_err();
        assert!(matches!(err, KarmaHubError::InvalidInput(msg) if msg.contains(".json")));
    }

    #[test]
    fn test_cell_text_integral_floats() {
        assert_eq!(cell_text(&Data::Float(9845012345.0)), "9845012345");
        assert_eq!(cell_text(&Data::Float(2.5)), "2.5");
        assert_eq!(cell_text(&Data::String(" CSE ".to_string())), "CSE");
        assert_eq!(cell_text(&Data::Empty), "");
    }
}
