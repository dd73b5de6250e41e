//! Lookback reductions over a dense daily table.

use chrono::{Datelike, NaiveDate};
use tracing::debug;

use crate::calendar;
use crate::domain::{DailyTable, Reducer, Term, WindowConfig, WindowedResult, WindowedRow};
use crate::error::TermError;

/// Reduce `config.column` over the period's month/day window for each of the
/// `config.lookback_years` years before `period_start.year()`.
///
/// The period's own start year is never included. A year whose window holds no
/// finite values yields NaN.
pub fn windowed_reduce(
    table: &DailyTable,
    period_start: NaiveDate,
    period_end: NaiveDate,
    config: &WindowConfig,
) -> Result<WindowedResult, TermError> {
    table.column(&config.column)?;
    let term = Term::from_dates(period_start, period_end)?;

    let last = period_start.year();
    let first = i32::try_from(config.lookback_years)
        .ok()
        .and_then(|n| last.checked_sub(n))
        .ok_or_else(|| {
            TermError::Config(format!(
                "Lookback of {} years before {last} is out of range.",
                config.lookback_years
            ))
        })?;

    // Years outside chrono's range fail on their first projection.
    let mut rows = Vec::new();
    for year in first..last {
        let (start, end) = calendar::window_in_year(&term, year, config.leap_day)?;
        let values = table.slice(&config.column, start, end)?;
        let value = reduce(values, config.reducer);
        if value.is_nan() {
            debug!(year, %start, %end, column = %config.column, "window has no values");
        }
        rows.push(WindowedRow { year, value });
    }

    Ok(WindowedResult {
        column: config.column.clone(),
        reducer: config.reducer,
        rows,
    })
}

/// NaN cells are skipped; with nothing left the result is NaN.
fn reduce(values: &[f64], reducer: Reducer) -> f64 {
    let (sum, n) = values
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        return f64::NAN;
    }
    match reducer {
        Reducer::Sum => sum,
        Reducer::Mean => sum / n as f64,
    }
}
