//! Implements pore-network topologies and the porosity-matched generator

mod gabriel;
mod generator;
mod pore_network;
pub use crate::network::gabriel::*;
pub use crate::network::generator::*;
pub use crate::network::pore_network::*;
