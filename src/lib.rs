//! Capnet - Capillary network toolkit for porous media analysis
//!
//! This crate implements the utilities supporting a digital-rock workflow:
//! generation of synthetic capillary bundles and networks matched to the
//! statistics of a scanned sample, porosity evaluation, and the readers and
//! writers for the centerline graph interchange format and the plain-text
//! tables produced by the imaging pipeline.

/// Defines a type alias for the error type as a static string
pub type StrError = &'static str;

mod bundle;
mod centerline;
mod network;
mod porosity;
mod stats;
mod tables;
pub use crate::bundle::*;
pub use crate::centerline::*;
pub use crate::network::*;
pub use crate::porosity::*;
pub use crate::stats::*;
pub use crate::tables::*;
