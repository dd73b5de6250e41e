//! Data sources for revision series.
//!
//! - `provider`: the `SeriesProvider` trait the aggregators depend on
//! - `memory`: in-process provider (tests, pre-loaded data)
//! - `http`: blocking client for a dataset gateway

pub mod http;
pub mod memory;
pub mod provider;

pub use http::HttpProvider;
pub use memory::{Bounds, MemoryProvider};
pub use provider::SeriesProvider;
