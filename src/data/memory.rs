//! In-memory `SeriesProvider`.
//!
//! Holds every dataset in process. Useful for tests and for callers that already
//! loaded their series some other way.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::data::provider::SeriesProvider;
use crate::domain::{Coordinate, Revision, RevisionSeries};
use crate::error::TermError;

/// Lat/lon box a dataset declares coverage for (inclusive).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl Bounds {
    pub const GLOBAL: Bounds = Bounds {
        lat_min: -90.0,
        lat_max: 90.0,
        lon_min: -180.0,
        lon_max: 180.0,
    };

    pub fn contains(&self, coordinate: Coordinate) -> bool {
        (self.lat_min..=self.lat_max).contains(&coordinate.lat)
            && (self.lon_min..=self.lon_max).contains(&coordinate.lon)
    }
}

#[derive(Debug, Clone)]
struct Cell {
    coordinate: Coordinate,
    series: HashMap<Revision, RevisionSeries>,
}

#[derive(Debug, Clone)]
struct Dataset {
    bounds: Bounds,
    chain: Vec<Revision>,
    cells: Vec<Cell>,
}

impl Dataset {
    fn cell(&self, dataset: &str, coordinate: Coordinate) -> Result<&Cell, TermError> {
        if !self.bounds.contains(coordinate) {
            return Err(TermError::CoordinateOutOfRange {
                dataset: dataset.to_string(),
                lat: coordinate.lat,
                lon: coordinate.lon,
            });
        }
        self.cells
            .iter()
            .find(|c| c.coordinate == coordinate)
            .ok_or_else(|| TermError::CoordinateNotFound {
                dataset: dataset.to_string(),
                lat: coordinate.lat,
                lon: coordinate.lon,
            })
    }
}

#[derive(Debug, Default)]
pub struct MemoryProvider {
    datasets: HashMap<String, Dataset>,
    series_fetches: AtomicUsize,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a dataset with its coverage and revision chain (most authoritative first).
    pub fn with_dataset<I, S>(mut self, name: &str, bounds: Bounds, chain: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let chain = chain.into_iter().map(Revision::new).collect();
        self.datasets.insert(
            name.to_string(),
            Dataset {
                bounds,
                chain,
                cells: Vec::new(),
            },
        );
        self
    }

    /// Attach one revision's series to a grid cell.
    ///
    /// Unknown datasets are registered with global bounds; unknown revisions are
    /// appended to the end (least authoritative) of the chain.
    pub fn with_series(
        mut self,
        dataset: &str,
        coordinate: Coordinate,
        revision: &str,
        series: RevisionSeries,
    ) -> Self {
        let entry = self.datasets.entry(dataset.to_string()).or_insert_with(|| Dataset {
            bounds: Bounds::GLOBAL,
            chain: Vec::new(),
            cells: Vec::new(),
        });

        let revision = Revision::new(revision);
        if !entry.chain.contains(&revision) {
            entry.chain.push(revision.clone());
        }

        match entry.cells.iter_mut().find(|c| c.coordinate == coordinate) {
            Some(cell) => {
                cell.series.insert(revision, series);
            }
            None => entry.cells.push(Cell {
                coordinate,
                series: HashMap::from([(revision, series)]),
            }),
        }
        self
    }

    /// How many `fetch_series` calls have been served.
    pub fn series_fetches(&self) -> usize {
        self.series_fetches.load(Ordering::Relaxed)
    }

    fn dataset(&self, name: &str) -> Result<&Dataset, TermError> {
        self.datasets
            .get(name)
            .ok_or_else(|| TermError::DatasetNotFound(name.to_string()))
    }
}

impl SeriesProvider for MemoryProvider {
    fn revision_chain(&self, coordinate: Coordinate, dataset: &str) -> Result<Vec<Revision>, TermError> {
        let ds = self.dataset(dataset)?;
        ds.cell(dataset, coordinate)?;
        Ok(ds.chain.clone())
    }

    fn fetch_series(
        &self,
        coordinate: Coordinate,
        dataset: &str,
        revision: &Revision,
    ) -> Result<RevisionSeries, TermError> {
        self.series_fetches.fetch_add(1, Ordering::Relaxed);
        let ds = self.dataset(dataset)?;
        let cell = ds.cell(dataset, coordinate)?;
        if !ds.chain.contains(revision) {
            return Err(TermError::UnknownRevision {
                dataset: dataset.to_string(),
                revision: revision.to_string(),
            });
        }
        Ok(cell.series.get(revision).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series() -> RevisionSeries {
        let d = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        RevisionSeries::from_observations(vec![(d, 1.0)]).unwrap()
    }

    #[test]
    fn unknown_dataset_is_not_found() {
        let p = MemoryProvider::new();
        let err = p.revision_chain(Coordinate::new(0.0, 0.0), "chirps").unwrap_err();
        assert_eq!(err, TermError::DatasetNotFound("chirps".to_string()));
    }

    #[test]
    fn coordinate_outside_bounds_is_out_of_range() {
        let bounds = Bounds {
            lat_min: -10.0,
            lat_max: 10.0,
            lon_min: -10.0,
            lon_max: 10.0,
        };
        let p = MemoryProvider::new().with_dataset("chirps", bounds, ["final"]);
        let err = p.revision_chain(Coordinate::new(45.0, 0.0), "chirps").unwrap_err();
        assert!(matches!(err, TermError::CoordinateOutOfRange { .. }));
    }

    #[test]
    fn coordinate_inside_bounds_without_cell_is_not_found() {
        let p = MemoryProvider::new().with_series("chirps", Coordinate::new(1.0, 1.0), "final", series());
        let err = p.revision_chain(Coordinate::new(2.0, 2.0), "chirps").unwrap_err();
        assert!(matches!(err, TermError::CoordinateNotFound { .. }));
    }

    #[test]
    fn authoritative_is_first_revision_in_chain() {
        let c = Coordinate::new(1.0, 1.0);
        let p = MemoryProvider::new()
            .with_series("chirps", c, "final", series())
            .with_series("chirps", c, "prelim", RevisionSeries::new());
        let chain = p.revision_chain(c, "chirps").unwrap();
        assert_eq!(chain, vec![Revision::new("final"), Revision::new("prelim")]);
        assert_eq!(p.fetch_authoritative(c, "chirps").unwrap(), series());
        assert_eq!(p.series_fetches(), 1);
    }

    #[test]
    fn revision_outside_chain_is_rejected() {
        let c = Coordinate::new(1.0, 1.0);
        let p = MemoryProvider::new().with_series("chirps", c, "final", series());
        let err = p.fetch_series(c, "chirps", &Revision::new("draft")).unwrap_err();
        assert!(matches!(err, TermError::UnknownRevision { .. }));
    }
}
