//! Shared data structures for sector tilt analysis
//!
//! - Sector: one antenna sector with validated radio measurements
//! - SectorState: classification assigned by the tilt advisor
//! - SuccessThreshold: operator-supplied success ratio cut-off

mod state;
mod sector;
mod threshold;

pub use state::*;
pub use sector::*;
pub use threshold::*;
