use capnet::{generate_bundle, BundleParameters, CenterlineGraph, StrError};
use rand::thread_rng;
use structopt::StructOpt;

/// Command line options
#[derive(StructOpt, Debug)]
#[structopt(
    name = "capillary_bundle",
    about = "Generates a synthetic capillary bundle from sample centerlines"
)]
struct Options {
    /// Directory containing output files
    out_folder: String,

    /// Sample porosity
    #[structopt(long, short = "p")]
    porosity: f64,

    /// Number of capillaries
    #[structopt(long, short = "n")]
    number: Option<usize>,
}

fn main() -> Result<(), StrError> {
    // parse options
    let options = Options::from_args();

    // load sample centerlines
    let path = format!("{}/centerlines.json", options.out_folder);
    let sample = CenterlineGraph::read_json(&path)?;

    // generate the bundle
    let params = BundleParameters {
        porosity: options.porosity,
        number: options.number,
    };
    let mut rng = thread_rng();
    let bundle = generate_bundle(&sample, &params, &mut rng)?;

    // save output centerlines file with the capillary bundle
    let path = format!("{}/capillary_bundle.json", options.out_folder);
    bundle.write_json(&path)?;
    println!("capillary bundle with {} capillaries written to {}", bundle.nedge(), path);
    Ok(())
}
