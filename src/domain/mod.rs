//! Domain types used throughout the crate.
//!
//! This module defines:
//!
//! - request/config structs (`TermRequest`, `HistoricalConfig`, `WindowConfig`)
//! - the sparse revision series and the dense daily table
//! - aggregation outputs (`TermSummary`, `HistoricalResult`, `WindowedResult`)

pub mod table;
pub mod types;

pub use table::*;
pub use types::*;
