//! Pattern module - Turns owned field paths into match patterns.
//!
//! Selector segments and trailing self markers are wildcarded so that an
//! owned region overlaps any element of the same list and anything nested
//! under a wholly owned container.

mod compile;

pub use compile::*;
