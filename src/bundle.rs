use crate::{CenterlineGraph, Edge, Node, StrError};
use rand::Rng;
use std::f64::consts::PI;

/// Holds the parameters of the capillary bundle generator
pub struct BundleParameters {
    /// Target porosity of the bundle (0 < porosity)
    pub porosity: f64,

    /// Number of capillaries (None means one per sample edge)
    pub number: Option<usize>,
}

/// Generates a parallel capillary bundle matched to a sample
///
/// Squared radii are sampled with replacement from the sample's edges. All
/// capillaries run along x across a cubic domain whose side L is chosen so
/// that the bundle porosity equals the target:
///
/// ```text
/// porosity = pi * sum(r2) * L / L^3   =>   L = sqrt(pi * sum(r2) / porosity)
/// ```
///
/// Each capillary i occupies nodes 2i (inlet face, x = 0) and 2i+1 (outlet
/// face, x = L) sharing random y and z positions in [0, L).
pub fn generate_bundle<R: Rng>(
    sample: &CenterlineGraph,
    params: &BundleParameters,
    rng: &mut R,
) -> Result<CenterlineGraph, StrError> {
    if params.porosity <= 0.0 {
        return Err("porosity must be positive");
    }
    let sample_r2 = sample.link_squared_radii();
    if sample_r2.is_empty() {
        return Err("sample graph has no edges");
    }
    let n = match params.number {
        Some(n) => n,
        None => sample_r2.len(),
    };
    if n == 0 {
        return Err("number of capillaries must be positive");
    }
    let r2: Vec<f64> = (0..n).map(|_| sample_r2[rng.gen_range(0..sample_r2.len())]).collect();
    let sum: f64 = r2.iter().sum();
    let side = f64::sqrt(PI * sum / params.porosity);
    let mut nodes = Vec::with_capacity(2 * n);
    let mut edges = Vec::with_capacity(n);
    for i in 0..n {
        let y = rng.gen::<f64>() * side;
        let z = rng.gen::<f64>() * side;
        nodes.push(Node::new(2 * i, r2[i], 0.0, y, z));
        nodes.push(Node::new(2 * i + 1, r2[i], side, y, z));
        edges.push(Edge::new(i, 2 * i, 2 * i + 1, side, r2[i]));
    }
    Ok(CenterlineGraph::new(nodes, edges))
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
