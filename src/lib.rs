//! # Ownership Drift
//!
//! Detects whether the fields a manager last wrote on a resource were later
//! written again by a different manager.
//!
//! Resources that track per-field ownership keep one record per historical
//! write, each carrying the manager, the operation, an optional timestamp and
//! a tree of the fields touched. This library flattens those trees into field
//! paths, compiles the original manager's paths into a wildcarded matcher and
//! scans the rest of the history for overlapping writes.
//!
//! ## Modules
//!
//! - [`fieldpath`] - Ownership trees, their wire codec and field path extraction
//! - [`pattern`] - Conversion of field paths into match patterns
//! - [`history`] - Ownership records, time ordering and latest-write lookup
//! - [`detect`] - Drift detection over a full ownership history

pub mod detect;
pub mod error;
pub mod fieldpath;
pub mod history;
pub mod pattern;

pub use detect::{detect_external_manager, Conflict, Conflicts, Detection, Detector, DetectorBuilder};
pub use error::{Error, Result};
pub use fieldpath::{extract_paths, FieldPath, OwnershipTree, Segment};
pub use history::{
    decode_records, decode_records_lenient, latest_owned, order_by_time, Operation, Ownership,
    OwnershipRecord,
};
pub use pattern::{compile_patterns, tree_to_paths, OwnedRegion};
