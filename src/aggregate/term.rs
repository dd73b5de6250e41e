//! Reducing one span of dates to `(total, count)`.

use chrono::NaiveDate;
use tracing::debug;

use crate::aggregate::revision::select_series;
use crate::calendar;
use crate::data::SeriesProvider;
use crate::domain::{RevisionSeries, TermConfig, TermRequest, TermSummary, TermTotal};
use crate::error::TermError;

/// Sum `series` over `dates`, clipping each day to `cap` first when given.
///
/// Clipping is one-sided: values below the cap pass through unchanged. Every
/// date must be present in the series; truncate `dates` beforehand when working
/// with preliminary data.
pub fn aggregate(series: &RevisionSeries, dates: &[NaiveDate], cap: Option<f64>) -> Result<TermTotal, TermError> {
    let mut total = 0.0;
    for &date in dates {
        let value = series.get(date).ok_or(TermError::MissingDate(date))?;
        total += match cap {
            Some(cap) => value.min(cap),
            None => value,
        };
    }
    Ok(TermTotal {
        total,
        count: dates.len(),
    })
}

/// Total over a single term, falling back to preliminary data when configured.
///
/// The returned `effective_end` is the end actually summed through; it is earlier
/// than `request.end` when preliminary data ran out.
pub fn sum_term<P: SeriesProvider + ?Sized>(
    provider: &P,
    request: &TermRequest,
    config: &TermConfig,
) -> Result<TermSummary, TermError> {
    let resolved = select_series(
        provider,
        request.coordinate,
        &request.dataset,
        request.end,
        config.use_prelim,
        config.preferred_revision.as_deref(),
    )?;

    let dates = calendar::resolve(request.start, resolved.effective_end)?;
    let totals = aggregate(&resolved.series, &dates, config.daily_cap)?;
    debug!(
        dataset = %request.dataset,
        start = %request.start,
        end = %resolved.effective_end,
        total = totals.total,
        days = totals.count,
        "summed term"
    );

    Ok(TermSummary {
        totals,
        status: resolved.status,
        requested_end: request.end,
        effective_end: resolved.effective_end,
    })
}
