//! CSV ingest of dense daily tables.
//!
//! Expected layout: a `date` column plus one column per measurement, one row per
//! day. Turning that into a `DailyTable` involves:
//! - header normalization (trim, lower-case, BOM strip)
//! - row-level validation (rows with unusable dates are skipped and reported)
//! - empty or unparsable cells stored as NaN, so reductions can skip them

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::{info, warn};

use crate::domain::DailyTable;
use crate::error::TermError;

const DATE_COLUMN: &str = "date";

/// A row-level problem encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: the table plus what was skipped along the way.
#[derive(Debug, Clone)]
pub struct IngestedTable {
    pub table: DailyTable,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Load a daily table from a CSV file.
pub fn load_daily_table(path: &Path) -> Result<IngestedTable, TermError> {
    let file = File::open(path)
        .map_err(|e| TermError::Io(format!("Failed to open CSV '{}': {e}", path.display())))?;
    let ingested = read_daily_table(file)?;
    info!(
        path = %path.display(),
        rows = ingested.table.len(),
        skipped = ingested.row_errors.len(),
        "loaded daily table"
    );
    Ok(ingested)
}

/// Load a daily table from any CSV reader.
pub fn read_daily_table<R: std::io::Read>(input: R) -> Result<IngestedTable, TermError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| TermError::Io(format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let date_idx = *header_map
        .get(DATE_COLUMN)
        .ok_or_else(|| TermError::MissingColumn(DATE_COLUMN.to_string()))?;

    let mut value_columns: Vec<(String, usize)> = header_map
        .iter()
        .filter(|(name, _)| name.as_str() != DATE_COLUMN && !name.is_empty())
        .map(|(name, idx)| (name.clone(), *idx))
        .collect();
    value_columns.sort_by_key(|(_, idx)| *idx);

    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        let date = match record.get(date_idx).map(parse_date) {
            Some(Ok(date)) => date,
            Some(Err(message)) => {
                row_errors.push(RowError { line, message });
                continue;
            }
            None => {
                row_errors.push(RowError {
                    line,
                    message: "Missing `date` value.".to_string(),
                });
                continue;
            }
        };

        let values: Vec<f64> = value_columns
            .iter()
            .map(|(_, col)| parse_cell(record.get(*col)))
            .collect();
        rows.push((date, values));
    }

    if !row_errors.is_empty() {
        warn!(count = row_errors.len(), "skipped rows while reading daily table");
    }
    if rows.is_empty() {
        return Err(TermError::DataMalformed(
            "No valid rows remain after reading the daily table.".to_string(),
        ));
    }

    let names = value_columns.into_iter().map(|(name, _)| name).collect();
    let table = DailyTable::from_rows(names, rows)?;

    Ok(IngestedTable {
        table,
        row_errors,
        rows_read,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    const FMTS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, YYYY/MM/DD, DD/MM/YYYY."
    ))
}

fn parse_cell(s: Option<&str>) -> f64 {
    s.filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(f64::NAN)
}
