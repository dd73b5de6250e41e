//! Projecting a recurring term onto a concrete year.
//!
//! Feb 29 has no counterpart in common years, so every projection goes through a
//! `LeapDayPolicy`. The same rule is used by the historical replay and by the
//! lookback windows so both always agree on which days a year covers.

use chrono::NaiveDate;

use crate::domain::{LeapDayPolicy, Term};
use crate::error::TermError;

/// Build `year-month-day`, applying `policy` when the day does not exist.
pub fn project_date(
    year: i32,
    month: u32,
    day: u32,
    policy: LeapDayPolicy,
) -> Result<NaiveDate, TermError> {
    if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
        return Ok(date);
    }

    let is_leap_day = month == 2 && day == 29;
    match policy {
        LeapDayPolicy::ClampToFeb28 if is_leap_day => NaiveDate::from_ymd_opt(year, 2, 28)
            .ok_or_else(|| TermError::InvalidDate(format!("Year {year} is out of range."))),
        LeapDayPolicy::Reject if is_leap_day => Err(TermError::InvalidDate(format!(
            "Feb 29 does not exist in {year}."
        ))),
        _ => Err(TermError::InvalidDate(format!(
            "{year}-{month:02}-{day:02} is not a calendar date."
        ))),
    }
}

/// Start and end of `term` when it starts in `year`.
///
/// The end lands in `year + term.year_offset`, so a term that crosses January 1st
/// keeps crossing it in every projected year.
pub fn term_in_year(
    term: &Term,
    year: i32,
    policy: LeapDayPolicy,
) -> Result<(NaiveDate, NaiveDate), TermError> {
    let start = project_date(year, term.start_month, term.start_day, policy)?;
    let end = project_date(year + term.year_offset, term.end_month, term.end_day, policy)?;
    Ok((start, end))
}

/// Lookback window of `term` starting in `year`.
///
/// A crossing term always ends in the following year, whatever its `year_offset`.
pub fn window_in_year(
    term: &Term,
    year: i32,
    policy: LeapDayPolicy,
) -> Result<(NaiveDate, NaiveDate), TermError> {
    let end_year = if term.crosses_year_boundary() { year + 1 } else { year };
    let start = project_date(year, term.start_month, term.start_day, policy)?;
    let end = project_date(end_year, term.end_month, term.end_day, policy)?;
    Ok((start, end))
}
