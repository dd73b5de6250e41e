//! The data source seen by the aggregators.

use crate::domain::{Coordinate, Revision, RevisionSeries};
use crate::error::TermError;

/// Serves per-revision daily series for a dataset at a coordinate.
///
/// Implementations own transport, caching, and retries. The aggregators call
/// each method at most a handful of times per request and never retry.
pub trait SeriesProvider {
    /// Revisions for `dataset`, most authoritative first.
    fn revision_chain(&self, coordinate: Coordinate, dataset: &str) -> Result<Vec<Revision>, TermError>;

    /// One revision's series, ascending by date.
    fn fetch_series(
        &self,
        coordinate: Coordinate,
        dataset: &str,
        revision: &Revision,
    ) -> Result<RevisionSeries, TermError>;

    /// Series of the authoritative (first) revision.
    fn fetch_authoritative(&self, coordinate: Coordinate, dataset: &str) -> Result<RevisionSeries, TermError> {
        let chain = self.revision_chain(coordinate, dataset)?;
        let first = chain
            .first()
            .ok_or_else(|| TermError::EmptyRevisionChain(dataset.to_string()))?;
        self.fetch_series(coordinate, dataset, first)
    }
}

impl<P: SeriesProvider + ?Sized> SeriesProvider for &P {
    fn revision_chain(&self, coordinate: Coordinate, dataset: &str) -> Result<Vec<Revision>, TermError> {
        (**self).revision_chain(coordinate, dataset)
    }

    fn fetch_series(
        &self,
        coordinate: Coordinate,
        dataset: &str,
        revision: &Revision,
    ) -> Result<RevisionSeries, TermError> {
        (**self).fetch_series(coordinate, dataset, revision)
    }

    fn fetch_authoritative(&self, coordinate: Coordinate, dataset: &str) -> Result<RevisionSeries, TermError> {
        (**self).fetch_authoritative(coordinate, dataset)
    }
}
