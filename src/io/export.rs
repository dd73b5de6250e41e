//! Export aggregation results to CSV.
//!
//! The exports are meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{HistoricalResult, WindowedResult};
use crate::error::TermError;

/// Write per-year historical totals to a CSV file.
pub fn write_historical_csv(path: &Path, result: &HistoricalResult) -> Result<(), TermError> {
    let mut file = create(path)?;
    write_historical(&mut file, result)
}

/// Write lookback rows to a CSV file.
pub fn write_windowed_csv(path: &Path, result: &WindowedResult) -> Result<(), TermError> {
    let mut file = create(path)?;
    write_windowed(&mut file, result)
}

fn create(path: &Path) -> Result<File, TermError> {
    File::create(path).map_err(|e| TermError::Io(format!("Failed to create export CSV '{}': {e}", path.display())))
}

fn write_historical<W: Write>(out: &mut W, result: &HistoricalResult) -> Result<(), TermError> {
    writeln!(out, "year,total,count,mean,status")
        .map_err(|e| TermError::Io(format!("Failed to write export CSV header: {e}")))?;

    for (year, totals) in &result.years {
        writeln!(
            out,
            "{},{:.4},{},{},{}",
            year,
            totals.total,
            totals.count,
            fmt_value(totals.mean()),
            result.status.label(),
        )
        .map_err(|e| TermError::Io(format!("Failed to write export CSV row: {e}")))?;
    }
    Ok(())
}

fn write_windowed<W: Write>(out: &mut W, result: &WindowedResult) -> Result<(), TermError> {
    writeln!(out, "year,value").map_err(|e| TermError::Io(format!("Failed to write export CSV header: {e}")))?;
    for row in &result.rows {
        writeln!(out, "{},{}", row.year, fmt_value(row.value))
            .map_err(|e| TermError::Io(format!("Failed to write export CSV row: {e}")))?;
    }
    Ok(())
}

/// NaN is written as an empty cell.
fn fmt_value(v: f64) -> String {
    if v.is_nan() { String::new() } else { format!("{v:.4}") }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use chrono::NaiveDate;

    use crate::domain::{Reducer, RevisionStatus, TermTotal, WindowedRow};

    #[test]
    fn historical_rows_in_year_order() {
        let end = NaiveDate::from_ymd_opt(2020, 6, 10).unwrap();
        let result = HistoricalResult {
            years: BTreeMap::from([
                (2001, TermTotal { total: 20.0, count: 10 }),
                (2000, TermTotal { total: 10.0, count: 10 }),
            ]),
            status: RevisionStatus::Final,
            requested_end: end,
            effective_end: end,
        };
        let mut buf = Vec::new();
        write_historical(&mut buf, &result).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "year,total,count,mean,status\n2000,10.0000,10,1.0000,final\n2001,20.0000,10,2.0000,final\n"
        );
    }

    #[test]
    fn windowed_nan_is_blank() {
        let result = WindowedResult {
            column: "rain".to_string(),
            reducer: Reducer::Mean,
            rows: vec![
                WindowedRow { year: 2018, value: f64::NAN },
                WindowedRow { year: 2019, value: 2.5 },
            ],
        };
        let mut buf = Vec::new();
        write_windowed(&mut buf, &result).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "year,value\n2018,\n2019,2.5000\n");
    }
}
