//! Reporting utilities: plain-text terminal output for aggregation results.

pub mod format;

pub use format::*;
