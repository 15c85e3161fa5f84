//! Input/output helpers.
//!
//! - model-artifact JSON read/write (`artifact`)
//! - leaderboard CSV export (`export`)

pub mod artifact;
pub mod export;

pub use artifact::*;
pub use export::*;
