//! Term aggregation.
//!
//! Responsibilities:
//!
//! - choose a revision for the term and decide on truncation (`revision`)
//! - reduce one span of dates to a capped total (`term`)
//! - replay a term across historical years (`historical`)
//! - lookback reductions over dense daily tables (`windowed`)

pub mod historical;
pub mod revision;
pub mod term;
pub mod windowed;

pub use historical::*;
pub use revision::*;
pub use term::*;
pub use windowed::*;
