use capnet::{CenterlineGraph, StrError};
use plotpy::{Curve, Histogram, Plot};
use structopt::StructOpt;

/// Command line options
#[derive(StructOpt, Debug)]
#[structopt(name = "plot_centerlines", about = "Centerline visualization")]
struct Options {
    /// Directory containing output files
    out_folder: String,

    /// Voxel size [m]
    #[structopt(long)]
    voxel: f64,

    /// Name of the input JSON file (stem without extension)
    #[structopt(long, default_value = "centerlines")]
    filename: String,
}

fn main() -> Result<(), StrError> {
    // parse options
    let options = Options::from_args();

    // load centerlines input file
    let path = format!("{}/{}.json", options.out_folder, options.filename);
    let graph = CenterlineGraph::read_json(&path)?;
    let (x, y, z) = graph.node_coordinates();

    // node diameters in micrometers
    let diameters: Vec<f64> = graph
        .node_squared_radii()
        .iter()
        .map(|r2| 2.0 * f64::sqrt(*r2) * options.voxel / 1.0e-6)
        .collect();

    // 3D point cloud of the skeleton
    let mut points = Curve::new();
    points
        .set_line_style("None")
        .set_marker_style(".")
        .set_marker_size(2.0);
    points.draw_3d(&x, &y, &z);
    let mut plot = Plot::new();
    plot.add(&points);
    plot.save(&format!("{}/{}_plot.svg", options.out_folder, options.filename))?;

    // pore size distribution
    let mut histogram = Histogram::new();
    histogram.set_number_bins(20);
    histogram.draw(&vec![diameters], &["centerlines"]);
    let mut plot = Plot::new();
    plot.add(&histogram)
        .grid_and_labels("Capillary voxel diameter [um]", "Number of capillary voxels")
        .save(&format!("{}/{}_dist.svg", options.out_folder, options.filename))?;
    Ok(())
}
