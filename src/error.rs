use chrono::NaiveDate;
use thiserror::Error;

/// Every failure a term aggregation can raise.
///
/// None of these are retried inside the crate. Multi-year calls abort on the
/// first error, so a caller never sees a partially built result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TermError {
    #[error("Invalid date range: end {end} is before start {start}.")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("{0}")]
    InvalidDate(String),

    #[error("No dataset named `{0}` is available.")]
    DatasetNotFound(String),

    #[error("Coordinate ({lat}, {lon}) is outside the bounds of dataset `{dataset}`.")]
    CoordinateOutOfRange { dataset: String, lat: f64, lon: f64 },

    #[error("Coordinate ({lat}, {lon}) has no grid cell in dataset `{dataset}`.")]
    CoordinateNotFound { dataset: String, lat: f64, lon: f64 },

    #[error("Malformed series data: {0}")]
    DataMalformed(String),

    #[error("No value for {0} in the selected series.")]
    MissingDate(NaiveDate),

    #[error("Column `{0}` is not present in the table.")]
    MissingColumn(String),

    #[error("Revision `{revision}` is not offered for dataset `{dataset}`.")]
    UnknownRevision { dataset: String, revision: String },

    #[error("Dataset `{0}` publishes no revisions for this coordinate.")]
    EmptyRevisionChain(String),

    #[error("{0}")]
    Config(String),

    #[error("{0}")]
    Io(String),

    #[error("Data source request failed: {0}")]
    Transport(String),
}

impl TermError {
    /// Process exit code used by the `cterm` binary.
    ///
    /// - 2: usage, configuration, or local file problems
    /// - 3: the requested data is absent or unusable for the request
    /// - 4: the remote data source failed
    pub fn exit_code(&self) -> u8 {
        match self {
            TermError::InvalidRange { .. }
            | TermError::InvalidDate(_)
            | TermError::Config(_)
            | TermError::Io(_) => 2,
            TermError::DatasetNotFound(_)
            | TermError::CoordinateOutOfRange { .. }
            | TermError::CoordinateNotFound { .. }
            | TermError::DataMalformed(_)
            | TermError::MissingDate(_)
            | TermError::MissingColumn(_)
            | TermError::UnknownRevision { .. }
            | TermError::EmptyRevisionChain(_) => 3,
            TermError::Transport(_) => 4,
        }
    }
}
