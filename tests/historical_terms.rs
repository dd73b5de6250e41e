//! End-to-end term aggregation against an in-memory data source.

use chrono::{Datelike, Duration, NaiveDate};

use climate_terms::data::{Bounds, MemoryProvider};
use climate_terms::domain::{
    Coordinate, HistoricalConfig, RevisionSeries, RevisionStatus, TermConfig, TermRequest,
};
use climate_terms::{TermError, build_historical, resolve_series, sum_term};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn cell() -> Coordinate {
    Coordinate::new(-3.25, 36.5)
}

fn series(start: NaiveDate, end: NaiveDate, value: impl Fn(NaiveDate) -> f64) -> RevisionSeries {
    start.iter_days().take_while(|x| *x <= end).map(|x| (x, value(x))).collect()
}

fn request(start: NaiveDate, end: NaiveDate) -> TermRequest {
    TermRequest {
        coordinate: cell(),
        dataset: "chirps-05".to_string(),
        start,
        end,
    }
}

/// Final data through `final_end`, preliminary through `prelim_end`.
fn two_revision_provider(final_end: NaiveDate, prelim_end: NaiveDate) -> MemoryProvider {
    MemoryProvider::new()
        .with_dataset(
            "chirps-05",
            Bounds {
                lat_min: -50.0,
                lat_max: 50.0,
                lon_min: -180.0,
                lon_max: 180.0,
            },
            ["final", "prelim"],
        )
        .with_series("chirps-05", cell(), "final", series(d(1981, 1, 1), final_end, |_| 1.0))
        .with_series("chirps-05", cell(), "prelim", series(d(1981, 1, 1), prelim_end, |_| 1.0))
}

#[test]
fn authoritative_only_is_always_final() {
    let p = two_revision_provider(d(2020, 12, 31), d(2021, 2, 1));
    let config = HistoricalConfig {
        start_year: 2010,
        end_year: Some(2020),
        ..HistoricalConfig::default()
    };
    let result = build_historical(&p, &request(d(2020, 3, 1), d(2020, 5, 31)), &config).unwrap();
    assert_eq!(result.status, RevisionStatus::Final);
    assert_eq!(result.years.len(), 11);
    assert!(result.years.values().all(|t| t.count == 92));
}

#[test]
fn truncation_scenario_shortens_every_year_by_the_same_days() {
    let day_d = d(2021, 6, 20);
    let p = two_revision_provider(day_d, day_d + Duration::days(3));
    let requested_end = day_d + Duration::days(5);

    let resolved = resolve_series(&p, cell(), "chirps-05", requested_end, None).unwrap();
    assert_eq!(resolved.status, RevisionStatus::Preliminary);
    assert_eq!(resolved.effective_end, day_d + Duration::days(3));

    let config = HistoricalConfig {
        start_year: 2015,
        end_year: Some(2021),
        use_prelim: true,
        ..HistoricalConfig::default()
    };
    let full_days = (requested_end - d(2021, 6, 1)).num_days() as usize + 1;
    let result = build_historical(&p, &request(d(2021, 6, 1), requested_end), &config).unwrap();

    assert_eq!(result.status, RevisionStatus::Preliminary);
    assert!(result.is_truncated());
    for (year, totals) in &result.years {
        assert_eq!(totals.count, full_days - 2, "year {year}");
    }
}

#[test]
fn prelim_within_final_coverage_stays_final() {
    let p = two_revision_provider(d(2021, 6, 30), d(2021, 7, 10));
    let config = TermConfig {
        use_prelim: true,
        ..TermConfig::default()
    };
    let summary = sum_term(&p, &request(d(2021, 6, 1), d(2021, 6, 30)), &config).unwrap();
    assert_eq!(summary.status, RevisionStatus::Final);
    assert!(!summary.is_truncated());
    assert_eq!(summary.totals.count, 30);
}

#[test]
fn crossing_term_keeps_crossing_in_every_year() {
    let p = MemoryProvider::new().with_series(
        "chirps-05",
        cell(),
        "final",
        series(d(1999, 1, 1), d(2021, 12, 31), |x| if x.month() == 12 { 2.0 } else { 1.0 }),
    );
    let config = HistoricalConfig {
        start_year: 2000,
        end_year: Some(2019),
        ..HistoricalConfig::default()
    };
    let result = build_historical(&p, &request(d(2020, 12, 25), d(2021, 1, 5)), &config).unwrap();
    for totals in result.years.values() {
        assert_eq!(totals.count, 12);
        assert!((totals.total - (7.0 * 2.0 + 5.0)).abs() < 1e-9);
    }
}

#[test]
fn leap_year_terms_count_the_extra_day() {
    let p = MemoryProvider::new().with_series(
        "chirps-05",
        cell(),
        "final",
        series(d(2000, 1, 1), d(2004, 12, 31), |_| 1.0),
    );
    let config = HistoricalConfig {
        start_year: 2000,
        end_year: Some(2003),
        ..HistoricalConfig::default()
    };
    let result = build_historical(&p, &request(d(2001, 2, 1), d(2001, 3, 1)), &config).unwrap();
    assert_eq!(result.get(2000).unwrap().count, 30);
    assert_eq!(result.get(2001).unwrap().count, 29);
}

#[test]
fn data_source_errors_reach_the_caller() {
    let p = two_revision_provider(d(2020, 1, 1), d(2020, 2, 1));
    let far_away = TermRequest {
        coordinate: Coordinate::new(80.0, 0.0),
        ..request(d(2019, 1, 1), d(2019, 1, 5))
    };
    let err = build_historical(&p, &far_away, &HistoricalConfig::default()).unwrap_err();
    assert!(matches!(err, TermError::CoordinateOutOfRange { .. }));

    let missing_cell = TermRequest {
        coordinate: Coordinate::new(0.0, 0.0),
        ..request(d(2019, 1, 1), d(2019, 1, 5))
    };
    let err = sum_term(&p, &missing_cell, &TermConfig::default()).unwrap_err();
    assert!(matches!(err, TermError::CoordinateNotFound { .. }));
}

#[test]
fn default_start_year_reaches_back_to_1981() {
    let p = two_revision_provider(d(2020, 12, 31), d(2021, 1, 31));
    let result = build_historical(&p, &request(d(2020, 1, 1), d(2020, 1, 10)), &HistoricalConfig::default()).unwrap();
    assert_eq!(result.years.keys().next(), Some(&1981));
    assert_eq!(result.years.keys().next_back(), Some(&2020));
    assert_eq!(p.series_fetches(), 1);
}
