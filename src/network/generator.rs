use super::{gabriel_seed_points, PoreNetwork};
use crate::{graph_porosity, CenterlineGraph, DensityHistogram, Edge, Node, PorosityTable, StrError};
use plotpy::{Canvas, Curve, Plot};
use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Defines the topology of the generated capillary network
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NetworkType {
    /// Regular lattice with 6-neighbor (face) connectivity
    Cubic,

    /// Regular lattice with 12-neighbor (edge-diagonal) connectivity (3D only)
    Cubic12,

    /// Gabriel graph over random points with boundary inlets/outlets
    Gabriel,
}

impl FromStr for NetworkType {
    type Err = StrError;
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "cubic" => Ok(NetworkType::Cubic),
            "cubic12" => Ok(NetworkType::Cubic12),
            "gabriel" => Ok(NetworkType::Gabriel),
            _ => Err("network type must be cubic, cubic12, or gabriel"),
        }
    }
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NetworkType::Cubic => write!(f, "cubic"),
            NetworkType::Cubic12 => write!(f, "cubic12"),
            NetworkType::Gabriel => write!(f, "gabriel"),
        }
    }
}

/// Parses comma-separated sample sizes "LX,LY,LZ" in meters
pub fn parse_sample_size(text: &str) -> Result<[f64; 3], StrError> {
    let values: Vec<&str> = text.split(',').collect();
    if values.len() != 3 {
        return Err("sample size must have three comma-separated values");
    }
    let mut size = [0.0; 3];
    for (i, value) in values.iter().enumerate() {
        size[i] = value.trim().parse().map_err(|_| "cannot parse sample size value")?;
    }
    Ok(size)
}

/// Holds the parameters of the porosity matching loop
pub struct MatchSettings {
    /// Voxel size [m]
    pub voxel_size: f64,

    /// Initial capillary length (lattice spacing) [m]
    pub capillary_length: f64,

    /// Porosity matching tolerance
    pub epsilon: f64,

    /// Spacing increment applied against the porosity error [m]
    pub delta: f64,

    /// Sample sizes along x, y, and z [m]
    pub sample_size: [f64; 3],

    /// Topology of the generated network
    pub network_type: NetworkType,

    /// Stops the loop after this many iterations (None means unbounded)
    pub max_iterations: Option<usize>,

    /// Enables the diagnostic plots written per iteration
    pub save_plots: bool,
}

/// Holds the distributions and porosity of a rock sample's centerlines
pub struct SampleStats {
    /// Capillary diameters [um]
    pub diameter_values: Vec<f64>,

    /// Capillary lengths [um]
    pub length_values: Vec<f64>,

    /// Node connectivities
    pub connectivity_values: Vec<f64>,

    /// Density histogram of diameters [um]
    pub diameter: DensityHistogram,

    /// Density histogram of lengths [um]
    pub length: DensityHistogram,

    /// Density histogram of connectivities
    pub connectivity: DensityHistogram,

    /// Porosity of the sample
    pub porosity: f64,
}

impl SampleStats {
    /// Computes the statistics of a rock sample centerline graph
    pub fn from_graph(graph: &CenterlineGraph, voxel_size: f64) -> Result<Self, StrError> {
        if voxel_size <= 0.0 {
            return Err("voxel size must be positive");
        }
        let micron = voxel_size * 1.0e6;
        let diameter_values: Vec<f64> = graph
            .link_squared_radii()
            .iter()
            .map(|r2| f64::sqrt(*r2) * 2.0 * micron)
            .collect();
        let length_values: Vec<f64> = graph.link_lengths().iter().map(|l| l * micron).collect();
        let connectivity_values: Vec<f64> = graph.connectivity()?.iter().map(|c| *c as f64).collect();
        let diameter = DensityHistogram::new(&diameter_values)?;
        let length = DensityHistogram::new(&length_values)?;
        let connectivity = DensityHistogram::new(&connectivity_values)?;
        let porosity = graph_porosity(graph, voxel_size)?;
        Ok(SampleStats {
            diameter_values,
            length_values,
            connectivity_values,
            diameter,
            length,
            connectivity,
            porosity,
        })
    }
}

/// Holds the outcome of the porosity matching loop
#[derive(Clone, Debug)]
pub struct MatchReport {
    /// Number of iterations performed
    pub iterations: usize,

    /// Porosity of the rock sample (target)
    pub porosity_rock: f64,

    /// Porosity of the last generated network
    pub porosity_network: f64,

    /// Final lattice spacing [m]
    pub spacing: f64,

    /// Whether the porosity error fell within epsilon
    pub converged: bool,
}

/// Generates a capillary network matching the sample statistics
///
/// Repeatedly builds a network of the requested topology, prunes and rewires
/// it to follow the sample's connectivity distribution, assigns capillary
/// diameters drawn from the sample's diameter distribution, and adjusts the
/// lattice spacing by a fixed increment against the sign of the porosity
/// error until the error falls within epsilon. The generated network is
/// written to `new-<filename>` in the output folder on every iteration, and
/// each target/generated porosity pair is appended to `porosity.txt`.
pub fn match_porosity<R: Rng>(
    settings: &MatchSettings,
    sample: &SampleStats,
    out_dir: &str,
    filename: &str,
    rng: &mut R,
) -> Result<MatchReport, StrError> {
    if settings.voxel_size <= 0.0 {
        return Err("voxel size must be positive");
    }
    if settings.capillary_length <= 0.0 {
        return Err("capillary length must be positive");
    }
    if settings.epsilon <= 0.0 {
        return Err("epsilon must be positive");
    }
    if settings.delta <= 0.0 {
        return Err("delta must be positive");
    }

    // adimensional (voxel units) quantities
    let lx_ad = settings.sample_size[0] / settings.voxel_size;
    let ly_ad = settings.sample_size[1] / settings.voxel_size;
    let lz_ad = settings.sample_size[2] / settings.voxel_size;
    let delta_ad = settings.delta / settings.voxel_size;
    let mut ds_ad = settings.capillary_length / settings.voxel_size;

    let mut porosity_table = PorosityTable::create(out_dir)?;
    let mut iterations = 0;
    let mut last_porosity = f64::NAN;
    loop {
        iterations += 1;
        if let Some(max) = settings.max_iterations {
            if iterations > max {
                return Ok(MatchReport {
                    iterations: iterations - 1,
                    porosity_rock: sample.porosity,
                    porosity_network: last_porosity,
                    spacing: ds_ad * settings.voxel_size,
                    converged: false,
                });
            }
        }
        if ds_ad <= 0.0 {
            return Err("lattice spacing became non-positive while matching the porosity");
        }

        // build the initial topology
        println!("#############################################################");
        println!("Initial Network");
        let (mut network, nz) = build_network(settings.network_type, lx_ad, ly_ad, lz_ad, ds_ad, rng)?;
        let initial_conns = network.conns.clone();

        // impose the sample's connectivity distribution
        println!("#############################################################");
        println!("Generating a network with the connectivity distribution of rock sample centerlines");
        apply_connectivity_distribution(&mut network, &sample.connectivity, rng)?;

        // re-attach pores left with a single link
        println!("#############################################################");
        println!("Finding nodes with only one link (throat) and adding one more link");
        reattach_single_pores(&mut network, &initial_conns, &sample.connectivity, nz, rng)?;

        if settings.save_plots {
            save_network_plot(&network, &Path::new(out_dir).join("capillary-network.svg"))?;
        }

        // trim everything outside the largest cluster
        let health = network.health();
        println!(
            "network health: clusters = {}, isolated pores = {}, pores to trim = {}",
            health.ncluster,
            health.isolated_pores.len(),
            health.trim_pores.len()
        );
        if !health.trim_pores.is_empty() {
            network.trim_pores(&health.trim_pores)?;
            if settings.save_plots {
                save_network_plot(&network, &Path::new(out_dir).join("capillary-network-healthy.svg"))?;
            }
            let health = network.health();
            println!(
                "network health: clusters = {}, isolated pores = {}, pores to trim = {}",
                health.ncluster,
                health.isolated_pores.len(),
                health.trim_pores.len()
            );
        }
        if network.nthroat() == 0 {
            return Err("generated network has no throats");
        }

        // assign capillary geometry and write the interchange file
        let (lengths, squared_radii) = assign_throat_properties(&network, &sample.diameter, settings.voxel_size, rng);
        let generated = network_to_graph(&network, &lengths, &squared_radii);
        let path = Path::new(out_dir).join(format!("new-{}", filename));
        generated.write_json_pretty(&path)?;

        // analyze the generated network from its own interchange file
        let generated = CenterlineGraph::read_json(&path)?;
        let micron = settings.voxel_size * 1.0e6;
        let gen_diameter: Vec<f64> = generated
            .link_squared_radii()
            .iter()
            .map(|r2| f64::sqrt(*r2) * 2.0 * micron)
            .collect();
        let gen_length: Vec<f64> = generated.link_lengths().iter().map(|l| l * micron).collect();
        let gen_connectivity: Vec<f64> = generated.connectivity()?.iter().map(|c| *c as f64).collect();
        let gen_diameter_hist = DensityHistogram::new(&gen_diameter)?;
        let gen_length_hist = DensityHistogram::new(&gen_length)?;
        let gen_connectivity_hist = DensityHistogram::new(&gen_connectivity)?;
        println!(
            "Cumulative probability density sum for diameter distribution = {}",
            gen_diameter_hist.density_sum()
        );
        println!(
            "Cumulative probability density sum for length distribution = {}",
            gen_length_hist.density_sum()
        );
        println!(
            "Cumulative probability density sum for connectivity = {}",
            gen_connectivity_hist.density_sum()
        );
        if settings.save_plots {
            save_comparison_plot(
                &sample.diameter_values,
                &gen_diameter,
                "Capillary diameter [um]",
                &Path::new(out_dir).join("capillary-diameter.svg"),
            )?;
            save_comparison_plot(
                &sample.length_values,
                &gen_length,
                "Capillary length [um]",
                &Path::new(out_dir).join("capillary-length.svg"),
            )?;
            save_comparison_plot(
                &sample.connectivity_values,
                &gen_connectivity,
                "Capillary connectivity",
                &Path::new(out_dir).join("capillary-connectivity.svg"),
            )?;
        }

        // compare porosities
        let porosity_network = graph_porosity(&generated, settings.voxel_size)?;
        last_porosity = porosity_network;
        porosity_table.append(sample.porosity, porosity_network)?;
        println!("#############################################################");
        println!("Rock sample porosity       = {}", sample.porosity);
        println!("Capillary network porosity = {}", porosity_network);
        println!("#############################################################");
        if porosity_network > 1.0 {
            println!("WARNING: the network porosity exceeds one, meaning that the");
            println!("capillaries overlap each other; increase the capillary length");
        }

        let porosity_diff = sample.porosity - porosity_network;
        if porosity_diff.abs() <= settings.epsilon {
            return Ok(MatchReport {
                iterations,
                porosity_rock: sample.porosity,
                porosity_network,
                spacing: ds_ad * settings.voxel_size,
                converged: true,
            });
        }
        if porosity_diff < 0.0 {
            ds_ad += delta_ad;
        } else {
            ds_ad -= delta_ad;
        }
    }
}

/// Builds the initial topology for the current lattice spacing
fn build_network<R: Rng>(
    network_type: NetworkType,
    lx_ad: f64,
    ly_ad: f64,
    lz_ad: f64,
    ds_ad: f64,
    rng: &mut R,
) -> Result<(PoreNetwork, usize), StrError> {
    let nx = (lx_ad / ds_ad) as usize + 1;
    let ny = (ly_ad / ds_ad) as usize + 1;
    let nz = (lz_ad / ds_ad) as usize + 1;
    println!("Nx,Ny,Nz = {} {} {}", nx, ny, nz);
    let network = match network_type {
        NetworkType::Cubic => PoreNetwork::cubic(nx, ny, nz, ds_ad)?,
        NetworkType::Cubic12 => {
            if nz > 2 {
                PoreNetwork::cubic12(nx, ny, nz, ds_ad)?
            } else {
                PoreNetwork::cubic(nx, ny, nz, ds_ad)?
            }
        }
        NetworkType::Gabriel => {
            let npoint = nx * ny * nz;
            let points = gabriel_seed_points(lx_ad, ly_ad, lz_ad, nx, ny, nz, npoint, rng);
            PoreNetwork::gabriel(&points)?
        }
    };
    Ok((network, nz))
}

/// Trims the throats of each pore down to a connectivity drawn from the sample
fn apply_connectivity_distribution<R: Rng>(
    network: &mut PoreNetwork,
    connectivity: &DensityHistogram,
    rng: &mut R,
) -> Result<(), StrError> {
    for pore in 0..network.npore() {
        let target = connectivity.sample(rng).max(0.0) as usize;
        let mut throats = network.find_neighbor_throats(pore);
        throats.shuffle(rng);
        if throats.len() > target && target > 0 {
            network.trim_throats(&throats[target..])?;
        }
    }
    Ok(())
}

/// Re-attaches pores left with exactly one neighbor
///
/// Candidate partners come from the pre-trim throat list. Flat networks get
/// one extra link; 3D networks get extra links up to a connectivity drawn
/// from the sample.
fn reattach_single_pores<R: Rng>(
    network: &mut PoreNetwork,
    initial_conns: &[[usize; 2]],
    connectivity: &DensityHistogram,
    nz: usize,
    rng: &mut R,
) -> Result<(), StrError> {
    for pore in 0..network.npore() {
        let neighbors = network.find_neighbor_pores(pore);
        if neighbors.len() != 1 {
            continue;
        }
        let sole = neighbors[0];
        if nz == 1 {
            for conn in initial_conns {
                if conn[0] == pore && conn[1] != sole {
                    network.connect_pores(pore, conn[1])?;
                    break;
                }
            }
        } else {
            let target = connectivity.sample(rng).max(0.0) as usize;
            let mut added = 1;
            for conn in initial_conns {
                if conn[0] == pore && conn[1] != sole && added < target {
                    network.connect_pores(pore, conn[1])?;
                    added += 1;
                }
            }
        }
    }
    Ok(())
}

/// Computes throat lengths and samples squared radii from the diameter histogram
fn assign_throat_properties<R: Rng>(
    network: &PoreNetwork,
    diameter: &DensityHistogram,
    voxel_size: f64,
    rng: &mut R,
) -> (Vec<f64>, Vec<f64>) {
    let lengths = network.throat_lengths();
    let squared_radii = (0..network.nthroat())
        .map(|_| {
            let d = diameter.sample(rng); // [um]
            let r = d / (2.0 * voxel_size * 1.0e6); // voxel units
            r * r
        })
        .collect();
    (lengths, squared_radii)
}

/// Converts a pore network to the centerline interchange format
///
/// Coordinates are shifted so that the minimum corner sits at the origin.
fn network_to_graph(network: &PoreNetwork, lengths: &[f64], squared_radii: &[f64]) -> CenterlineGraph {
    let mut min = [f64::MAX; 3];
    for coord in &network.coords {
        for i in 0..3 {
            if coord[i] < min[i] {
                min[i] = coord[i];
            }
        }
    }
    let nodes = network
        .coords
        .iter()
        .enumerate()
        .map(|(i, c)| Node::new(i, 1.0, c[0] - min[0], c[1] - min[1], c[2] - min[2]))
        .collect();
    let edges = network
        .conns
        .iter()
        .enumerate()
        .map(|(i, conn)| Edge::new(i, conn[0], conn[1], lengths[i], squared_radii[i]))
        .collect();
    CenterlineGraph::new(nodes, edges)
}

/// Saves a 3D plot with the network's throats and pores
fn save_network_plot(network: &PoreNetwork, path: &Path) -> Result<(), StrError> {
    let mut connections = Canvas::new();
    connections.set_edge_color("#4c72b0");
    for conn in &network.conns {
        let a = &network.coords[conn[0]];
        let b = &network.coords[conn[1]];
        connections.draw_polyline(&[[a[0], a[1], a[2]], [b[0], b[1], b[2]]], false);
    }
    let (mut x, mut y, mut z) = (Vec::new(), Vec::new(), Vec::new());
    for coord in &network.coords {
        x.push(coord[0]);
        y.push(coord[1]);
        z.push(coord[2]);
    }
    let mut pores = Curve::new();
    pores
        .set_line_style("None")
        .set_marker_style("o")
        .set_marker_color("red")
        .set_marker_size(3.0);
    pores.draw_3d(&x, &y, &z);
    let mut plot = Plot::new();
    plot.add(&connections).add(&pores);
    plot.save(path)?;
    Ok(())
}

/// Saves the overlay of the sample and generated density distributions
fn save_comparison_plot(rock: &[f64], generated: &[f64], xlabel: &str, path: &Path) -> Result<(), StrError> {
    let rock_hist = DensityHistogram::new(rock)?;
    let gen_hist = DensityHistogram::new(generated)?;
    let mut rock_curve = Curve::new();
    rock_curve.set_label("rock sample").set_marker_style("s");
    rock_curve.draw(&rock_hist.centers(), &rock_hist.density().to_vec());
    let mut gen_curve = Curve::new();
    gen_curve.set_label("gen. network").set_marker_style("o");
    gen_curve.draw(&gen_hist.centers(), &gen_hist.density().to_vec());
    let mut plot = Plot::new();
    plot.add(&rock_curve)
        .add(&gen_curve)
        .grid_and_labels(xlabel, "Probability Density")
        .legend()
        .save(path)?;
    Ok(())
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
