//! Calendar arithmetic: range expansion and year projection.

pub mod project;
pub mod range;

pub use project::*;
pub use range::*;
