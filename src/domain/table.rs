//! Dense, date-indexed table of daily values.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::TermError;

/// Daily rows sorted by date, with any number of named numeric columns.
///
/// Missing cells are stored as NaN.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailyTable {
    dates: Vec<NaiveDate>,
    columns: BTreeMap<String, Vec<f64>>,
}

impl DailyTable {
    /// Build a table from rows of `(date, [values in column order])`.
    ///
    /// Rows may arrive in any order; repeated dates are rejected.
    pub fn from_rows(
        column_names: Vec<String>,
        rows: Vec<(NaiveDate, Vec<f64>)>,
    ) -> Result<Self, TermError> {
        let mut rows = rows;
        rows.sort_by_key(|(date, _)| *date);

        if let Some(pair) = rows.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(TermError::DataMalformed(format!(
                "date {} appears more than once",
                pair[0].0
            )));
        }

        let mut columns: BTreeMap<String, Vec<f64>> = column_names
            .iter()
            .map(|name| (name.clone(), Vec::with_capacity(rows.len())))
            .collect();
        let mut dates = Vec::with_capacity(rows.len());

        for (date, values) in rows {
            if values.len() != column_names.len() {
                return Err(TermError::DataMalformed(format!(
                    "row {date} has {} values, expected {}",
                    values.len(),
                    column_names.len()
                )));
            }
            dates.push(date);
            for (name, value) in column_names.iter().zip(values) {
                if let Some(col) = columns.get_mut(name) {
                    col.push(value);
                }
            }
        }

        Ok(Self { dates, columns })
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn column(&self, name: &str) -> Result<&[f64], TermError> {
        self.columns
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| TermError::MissingColumn(name.to_string()))
    }

    /// Values of `column` for rows dated within `[start, end]`.
    ///
    /// Yields an empty slice when no rows fall in the window or when `end < start`.
    pub fn slice(&self, column: &str, start: NaiveDate, end: NaiveDate) -> Result<&[f64], TermError> {
        let values = self.column(column)?;
        let lo = self.dates.partition_point(|d| *d < start);
        let hi = self.dates.partition_point(|d| *d <= end);
        if hi <= lo {
            return Ok(&[]);
        }
        Ok(&values[lo..hi])
    }
}
