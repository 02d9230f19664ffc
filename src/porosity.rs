use crate::{CenterlineGraph, StrError};
use std::f64::consts::PI;

/// Computes the total volume of a set of cylindrical capillaries
///
/// Lengths and squared radii must be in consistent units; the volume comes
/// out in the cube of that unit.
pub fn capillary_volume(link_length: &[f64], link_squared_radius: &[f64]) -> f64 {
    link_length
        .iter()
        .zip(link_squared_radius.iter())
        .map(|(length, r2)| PI * r2 * length)
        .sum()
}

/// Computes the projected (diameter times length) area of a set of capillaries
///
/// This is the void area of a flat network where capillaries occupy a plane.
pub fn capillary_projected_area(link_length: &[f64], link_squared_radius: &[f64]) -> f64 {
    link_length
        .iter()
        .zip(link_squared_radius.iter())
        .map(|(length, r2)| 2.0 * f64::sqrt(*r2) * length)
        .sum()
}

/// Evaluates the porosity (void fraction) of a centerline graph
///
/// Capillary dimensions are converted from voxel units to SI with the voxel
/// size. The bulk volume is the node bounding box; for flat graphs (zero
/// extent along z) the void fraction is areal instead of volumetric.
///
/// A result greater than one means the capillaries overlap each other.
pub fn graph_porosity(graph: &CenterlineGraph, voxel_size: f64) -> Result<f64, StrError> {
    if voxel_size <= 0.0 {
        return Err("voxel size must be positive");
    }
    let link_length: Vec<f64> = graph.link_lengths().iter().map(|l| l * voxel_size).collect();
    let link_squared_radius: Vec<f64> = graph
        .link_squared_radii()
        .iter()
        .map(|r2| r2 * voxel_size * voxel_size)
        .collect();
    let (min, max) = graph.bounding_box()?;
    let dx = (max[0] - min[0]) * voxel_size;
    let dy = (max[1] - min[1]) * voxel_size;
    let dz = (max[2] - min[2]) * voxel_size;
    if dz != 0.0 {
        let volume = dx * dy * dz;
        if volume <= 0.0 {
            return Err("graph bounding box has zero volume");
        }
        Ok(capillary_volume(&link_length, &link_squared_radius) / volume)
    } else {
        let area = dx * dy;
        if area <= 0.0 {
            return Err("graph bounding box has zero area");
        }
        Ok(capillary_projected_area(&link_length, &link_squared_radius) / area)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
