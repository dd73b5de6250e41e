//! Replaying a term across historical years.
//!
//! The series is fetched once; every year's term is then reduced from it. The
//! month/day span of the term comes from the request's start and its effective
//! end, so a truncation caused by preliminary data shortens every year alike.

use std::collections::BTreeMap;

use chrono::Datelike;
use tracing::debug;

use crate::aggregate::revision::select_series;
use crate::aggregate::term::aggregate;
use crate::calendar;
use crate::data::SeriesProvider;
use crate::domain::{HistoricalConfig, HistoricalResult, Term, TermRequest};
use crate::error::TermError;

/// Per-year `(total, count)` of the request's term for `start_year..=end_year`.
///
/// Years are keyed by the year the term starts in. Fails on the first year that
/// cannot be reduced; no partial result is returned.
pub fn build_historical<P: SeriesProvider + ?Sized>(
    provider: &P,
    request: &TermRequest,
    config: &HistoricalConfig,
) -> Result<HistoricalResult, TermError> {
    let resolved = select_series(
        provider,
        request.coordinate,
        &request.dataset,
        request.end,
        config.use_prelim,
        config.preferred_revision.as_deref(),
    )?;

    let term = Term::from_dates(request.start, resolved.effective_end)?;
    let end_year = config.end_year.unwrap_or_else(|| request.start.year());

    let mut years = BTreeMap::new();
    for year in config.start_year..=end_year {
        let (start, end) = calendar::term_in_year(&term, year, config.leap_day)?;
        let dates = calendar::resolve(start, end)?;
        let totals = aggregate(&resolved.series, &dates, config.daily_cap)?;
        debug!(year, %start, %end, total = totals.total, days = totals.count, "reduced historical term");
        years.insert(year, totals);
    }

    Ok(HistoricalResult {
        years,
        status: resolved.status,
        requested_end: request.end,
        effective_end: resolved.effective_end,
    })
}
