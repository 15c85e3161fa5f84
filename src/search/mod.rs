//! Grid-search orchestration.
//!
//! Responsibilities:
//!
//! - enumerate the pipeline grid (time x speed x direction x model)
//! - generate expanding-window cross-validation folds
//! - evaluate each candidate (parallel) and select the best by CV MAPE

pub mod cv;
pub mod grid;
pub mod runner;

pub use cv::*;
pub use grid::*;
pub use runner::*;
