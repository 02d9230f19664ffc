//! Implements the centerline graph interchange format

mod graph;
pub use crate::centerline::graph::*;
