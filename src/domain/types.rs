//! Shared domain types.
//!
//! These types are intentionally plain values so they can be:
//!
//! - built by tests without touching a data source
//! - passed between the resolver, the aggregators, and the report layer
//! - exported to CSV/JSON by callers

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::TermError;

/// First year covered by the gridded rainfall datasets.
pub const HISTORICAL_START_YEAR: i32 = 1981;

/// A latitude/longitude pair identifying a grid cell.
///
/// Snapping an arbitrary location onto a dataset's grid is the data source's job;
/// this crate passes the coordinate through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.lat, self.lon)
    }
}

/// Name of one revision in a dataset's revision chain (e.g. `final`, `prelim`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Revision(pub String);

impl Revision {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Inclusive calendar date range with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, TermError> {
        if end < start {
            return Err(TermError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of calendar days covered, both ends included.
    pub fn len_days(&self) -> usize {
        ((self.end - self.start).num_days() + 1) as usize
    }

    /// Every date in the range, ascending.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |d| *d <= self.end)
    }
}

/// One revision snapshot of a dataset at a coordinate: date -> daily value.
///
/// Keys are unique and iterate in ascending date order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RevisionSeries {
    values: BTreeMap<NaiveDate, f64>,
}

impl RevisionSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a series from raw observations, rejecting repeated dates.
    pub fn from_observations(
        observations: impl IntoIterator<Item = (NaiveDate, f64)>,
    ) -> Result<Self, TermError> {
        let mut values = BTreeMap::new();
        for (date, value) in observations {
            if values.insert(date, value).is_some() {
                return Err(TermError::DataMalformed(format!(
                    "date {date} appears more than once"
                )));
            }
        }
        Ok(Self { values })
    }

    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.values.get(&date).copied()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.values.contains_key(&date)
    }

    pub fn first_key(&self) -> Option<NaiveDate> {
        self.values.keys().next().copied()
    }

    /// Most recent date with data.
    pub fn last_key(&self) -> Option<NaiveDate> {
        self.values.keys().next_back().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(NaiveDate, f64)> for RevisionSeries {
    /// Later entries win on repeated dates; use `from_observations` for untrusted input.
    fn from_iter<I: IntoIterator<Item = (NaiveDate, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Whether every value consumed came from the authoritative revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevisionStatus {
    Final,
    Preliminary,
}

impl RevisionStatus {
    pub fn is_final(self) -> bool {
        self == RevisionStatus::Final
    }

    pub fn label(self) -> &'static str {
        match self {
            RevisionStatus::Final => "final",
            RevisionStatus::Preliminary => "preliminary",
        }
    }
}

/// A recurring month/day span, derived from a representative `(start, end)` pair.
///
/// `year_offset` is `end.year - start.year` of that pair; a positive offset means
/// the term crosses January 1st.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub start_month: u32,
    pub start_day: u32,
    pub end_month: u32,
    pub end_day: u32,
    pub year_offset: i32,
}

impl Term {
    pub fn from_dates(start: NaiveDate, end: NaiveDate) -> Result<Self, TermError> {
        DateRange::new(start, end)?;
        Ok(Self {
            start_month: start.month(),
            start_day: start.day(),
            end_month: end.month(),
            end_day: end.day(),
            year_offset: end.year() - start.year(),
        })
    }

    pub fn crosses_year_boundary(&self) -> bool {
        self.year_offset > 0
    }
}

/// How to project Feb 29 onto a year that has no such day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum LeapDayPolicy {
    /// Use Feb 28 of the target year.
    #[default]
    ClampToFeb28,
    /// Fail with `TermError::InvalidDate`.
    Reject,
}

/// Reduction applied to one year's window of a dense table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Reducer {
    Sum,
    Mean,
}

impl Reducer {
    pub fn label(self) -> &'static str {
        match self {
            Reducer::Sum => "sum",
            Reducer::Mean => "mean",
        }
    }
}

/// `(total, day count)` for one span of dates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TermTotal {
    pub total: f64,
    pub count: usize,
}

impl TermTotal {
    /// Mean daily value; NaN when no days were reduced.
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            return f64::NAN;
        }
        self.total / self.count as f64
    }
}

/// What to aggregate: a dataset at a coordinate over a representative term.
#[derive(Debug, Clone, PartialEq)]
pub struct TermRequest {
    pub coordinate: Coordinate,
    pub dataset: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Options for a single-term sum.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermConfig {
    /// Per-day ceiling applied before summing. `None` disables clipping.
    pub daily_cap: Option<f64>,
    /// Fall back to preliminary revisions (and truncate) when final data runs out.
    pub use_prelim: bool,
    /// Revision to probe before the authoritative one.
    pub preferred_revision: Option<String>,
}

/// Options for replaying a term across historical years.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalConfig {
    /// First year (of the term start) to include.
    pub start_year: i32,
    /// Last year to include. Defaults to the request's start year.
    pub end_year: Option<i32>,
    pub daily_cap: Option<f64>,
    pub use_prelim: bool,
    pub preferred_revision: Option<String>,
    pub leap_day: LeapDayPolicy,
}

impl Default for HistoricalConfig {
    fn default() -> Self {
        Self {
            start_year: HISTORICAL_START_YEAR,
            end_year: None,
            daily_cap: None,
            use_prelim: false,
            preferred_revision: None,
            leap_day: LeapDayPolicy::default(),
        }
    }
}

impl HistoricalConfig {
    pub fn term_config(&self) -> TermConfig {
        TermConfig {
            daily_cap: self.daily_cap,
            use_prelim: self.use_prelim,
            preferred_revision: self.preferred_revision.clone(),
        }
    }
}

/// Options for the lookback reduction over a dense table.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowConfig {
    pub lookback_years: u32,
    pub column: String,
    pub reducer: Reducer,
    pub leap_day: LeapDayPolicy,
}

/// Result of a single-term sum.
#[derive(Debug, Clone, PartialEq)]
pub struct TermSummary {
    pub totals: TermTotal,
    pub status: RevisionStatus,
    pub requested_end: NaiveDate,
    pub effective_end: NaiveDate,
}

impl TermSummary {
    pub fn is_truncated(&self) -> bool {
        self.effective_end != self.requested_end
    }
}

/// Per-year totals for a term replayed across history.
///
/// Keys are the year the term starts in.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalResult {
    pub years: BTreeMap<i32, TermTotal>,
    pub status: RevisionStatus,
    pub requested_end: NaiveDate,
    pub effective_end: NaiveDate,
}

impl HistoricalResult {
    /// True when preliminary data ran out and every year's term was shortened.
    pub fn is_truncated(&self) -> bool {
        self.effective_end != self.requested_end
    }

    pub fn get(&self, year: i32) -> Option<&TermTotal> {
        self.years.get(&year)
    }
}

/// One lookback year's reduced value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowedRow {
    pub year: i32,
    pub value: f64,
}

/// Year-indexed table produced by the lookback reduction, ascending by year.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowedResult {
    pub column: String,
    pub reducer: Reducer,
    pub rows: Vec<WindowedRow>,
}

impl WindowedResult {
    pub fn years(&self) -> Vec<i32> {
        self.rows.iter().map(|r| r.year).collect()
    }

    pub fn get(&self, year: i32) -> Option<f64> {
        self.rows.iter().find(|r| r.year == year).map(|r| r.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn date_range_rejects_reversed_bounds() {
        let err = DateRange::new(d(2020, 1, 2), d(2020, 1, 1)).unwrap_err();
        assert!(matches!(err, TermError::InvalidRange { .. }));
    }

    #[test]
    fn series_rejects_duplicate_dates() {
        let obs = vec![(d(2020, 1, 1), 1.0), (d(2020, 1, 1), 2.0)];
        assert!(matches!(
            RevisionSeries::from_observations(obs),
            Err(TermError::DataMalformed(_))
        ));
    }

    #[test]
    fn series_last_key_is_latest_date() {
        let series = RevisionSeries::from_observations(vec![
            (d(2020, 1, 3), 3.0),
            (d(2020, 1, 1), 1.0),
            (d(2020, 1, 2), 2.0),
        ])
        .unwrap();
        assert_eq!(series.first_key(), Some(d(2020, 1, 1)));
        assert_eq!(series.last_key(), Some(d(2020, 1, 3)));
    }

    #[test]
    fn term_records_year_offset() {
        let term = Term::from_dates(d(2020, 12, 25), d(2021, 1, 5)).unwrap();
        assert!(term.crosses_year_boundary());
        assert_eq!((term.end_month, term.end_day), (1, 5));

        let flat = Term::from_dates(d(2020, 6, 1), d(2020, 6, 10)).unwrap();
        assert!(!flat.crosses_year_boundary());
    }

    #[test]
    fn mean_of_empty_total_is_nan() {
        let t = TermTotal { total: 0.0, count: 0 };
        assert!(t.mean().is_nan());
        let t = TermTotal { total: 10.0, count: 4 };
        assert!((t.mean() - 2.5).abs() < 1e-12);
    }
}
