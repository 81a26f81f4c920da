//! Detect module - Finds fields overwritten by unexpected managers.
//!
//! The detector takes the region an original manager owns in its latest
//! write and looks for writes by other managers that land inside it.

mod conflict;
mod detector;


pub use conflict::*;
pub use detector::*;
