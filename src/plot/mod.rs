//! Terminal plotting for the holdout forecast.

pub mod ascii;

pub use ascii::*;
