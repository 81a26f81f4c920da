//! Field path module - Ownership trees and the field paths they own.
//!
//! An ownership tree is the per-field record attached to one historical
//! write. This module decodes it from its wire form and flattens it into
//! slash-delimited [`FieldPath`]s.

mod path;
mod serialize;
mod tree;

pub use path::*;
pub use serialize::*;
pub use tree::*;
