//! Input/output helpers.
//!
//! - CSV ingest of dense daily tables (`ingest`)
//! - result exports to CSV (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
