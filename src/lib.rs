//! `climate-terms` library crate.
//!
//! Sums and averages of daily climate series over recurring calendar terms,
//! replayed across historical years, with fallback to preliminary revisions when
//! final data does not yet cover a term.
//!
//! The binary (`cterm`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the data source is injected (`data::SeriesProvider`) and can be faked

pub mod aggregate;
pub mod app;
pub mod calendar;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod report;

pub use aggregate::{aggregate, build_historical, resolve_series, sum_term, windowed_reduce};
pub use calendar::resolve;
pub use data::{MemoryProvider, SeriesProvider};
pub use error::TermError;
