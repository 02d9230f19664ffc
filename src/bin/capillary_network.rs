use capnet::{match_porosity, parse_sample_size, CenterlineGraph, MatchSettings, NetworkType, SampleStats, StrError};
use plotpy::{Histogram, Plot};
use rand::thread_rng;
use structopt::StructOpt;

/// Command line options
///
/// The generated network takes into account the distributions of pore
/// diameter, capillary length, and connectivity of the rock sample.
#[derive(StructOpt, Debug)]
#[structopt(
    name = "capillary_network",
    about = "Generates a 2D or 3D capillary network from sample centerlines"
)]
struct Options {
    /// Directory containing output files
    out_folder: String,

    /// Voxel size [m]
    #[structopt(long)]
    voxel_size: f64,

    /// Capillary length [m] for regular networks (cubic, for example)
    #[structopt(long)]
    capillary_length: f64,

    /// Precision for porosity matching
    #[structopt(long)]
    epsilon: f64,

    /// Increment in capillary length [m] to achieve the target porosity
    #[structopt(long)]
    delta: f64,

    /// Sample sizes [m] along x, y and z (comma-separated values)
    #[structopt(long)]
    sample_size: String,

    /// Network type: cubic, gabriel, cubic12 (3D only)
    #[structopt(long)]
    network_type: NetworkType,

    /// Name of the input JSON file
    #[structopt(long, default_value = "centerlines.json")]
    filename: String,

    /// Maximum number of matching iterations
    #[structopt(long)]
    max_iterations: Option<usize>,
}

fn main() -> Result<(), StrError> {
    // parse options
    let options = Options::from_args();
    println!("Starting the execution...");
    let sample_size = parse_sample_size(&options.sample_size)?;

    // read the centerlines obtained from micro CT scan rock tomography
    let path = format!("{}/{}", options.out_folder, options.filename);
    let graph = CenterlineGraph::read_json(&path)?;
    println!("#############################################################");
    println!("Some statistics of rock sample centerlines");
    println!("#############################################################");
    println!("nodes = {}", graph.nnode());
    println!("edges = {}", graph.nedge());
    println!("#############################################################");
    println!("Calculating the nodes connectivity of rock sample centerlines");

    // histograms and probability density distributions of the rock sample
    let stats = SampleStats::from_graph(&graph, options.voxel_size)?;
    println!(
        "Cumulative probability density sum for diameter distribution = {}",
        stats.diameter.density_sum()
    );
    println!(
        "Cumulative probability density sum for length distribution = {}",
        stats.length.density_sum()
    );
    println!(
        "Cumulative probability density sum for connectivity = {}",
        stats.connectivity.density_sum()
    );
    save_rock_histogram(
        &stats.diameter_values,
        "Capillary diameter [um]",
        &format!("{}/rock-diameter.svg", options.out_folder),
    )?;
    save_rock_histogram(
        &stats.length_values,
        "Capillary length [um]",
        &format!("{}/rock-length.svg", options.out_folder),
    )?;
    save_rock_histogram(
        &stats.connectivity_values,
        "Capillary connectivity",
        &format!("{}/rock-connectivity.svg", options.out_folder),
    )?;

    // generate the capillary network matching the sample porosity
    let settings = MatchSettings {
        voxel_size: options.voxel_size,
        capillary_length: options.capillary_length,
        epsilon: options.epsilon,
        delta: options.delta,
        sample_size,
        network_type: options.network_type,
        max_iterations: options.max_iterations,
        save_plots: true,
    };
    let mut rng = thread_rng();
    let report = match_porosity(&settings, &stats, &options.out_folder, &options.filename, &mut rng)?;
    if !report.converged {
        println!(
            "WARNING: stopped after {} iterations without reaching the target porosity",
            report.iterations
        );
    }
    println!("program finished");
    Ok(())
}

/// Saves a histogram of one distribution of the rock sample
fn save_rock_histogram(values: &[f64], xlabel: &str, path: &str) -> Result<(), StrError> {
    let mut histogram = Histogram::new();
    histogram.set_number_bins(20);
    histogram.draw(&vec![values.to_vec()], &["rock sample"]);
    let mut plot = Plot::new();
    plot.add(&histogram)
        .grid_and_labels(xlabel, "Frequency")
        .save(path)?;
    Ok(())
}
