//! Inclusive date range expansion.

use chrono::NaiveDate;

use crate::domain::DateRange;
use crate::error::TermError;

/// Every calendar date from `start` to `end`, both included, ascending.
pub fn resolve(start: NaiveDate, end: NaiveDate) -> Result<Vec<NaiveDate>, TermError> {
    let range = DateRange::new(start, end)?;
    let mut dates = Vec::with_capacity(range.len_days());
    dates.extend(range.dates());
    Ok(dates)
}
