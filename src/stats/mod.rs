//! Implements histograms, weighted sampling, and small numerical helpers

mod density_histogram;
mod gradient;
pub use crate::stats::density_histogram::*;
pub use crate::stats::gradient::*;
