//! History module - Ownership records and scans over them.
//!
//! Each record is one historical write to a resource. The scanner orders
//! records by time and finds the latest write of a given manager.

mod record;
mod scanner;

pub use record::*;
pub use scanner::*;

pub(crate) use scanner::{is_tracked, latest_in_order};
