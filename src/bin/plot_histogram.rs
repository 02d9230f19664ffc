use capnet::{GreyscaleHistogram, StrError};
use plotpy::{Barplot, Curve, Plot, Text};
use structopt::StructOpt;

/// Command line options
#[derive(StructOpt, Debug)]
#[structopt(
    name = "plot_histogram",
    about = "Plots the greyscale histograms with the segmentation threshold"
)]
struct Options {
    /// Segmentation threshold (greyscale level)
    threshold: f64,

    /// Directory containing output files
    out_folder: String,
}

fn main() -> Result<(), StrError> {
    // parse options
    let options = Options::from_args();

    // read histogram file from the output folder
    let path = format!("{}/histogram.dat", options.out_folder);
    let histogram = GreyscaleHistogram::read(&path)?;

    // normalized histogram
    save_histogram_figure(
        &histogram.bins,
        &histogram.normalized,
        options.threshold,
        "Normalised histogram",
        "Normalised frequency",
        &format!("{}/norm_hist.svg", options.out_folder),
    )?;

    // accumulated histogram
    save_histogram_figure(
        &histogram.bins,
        &histogram.accumulated,
        options.threshold,
        "Accumulated histogram",
        "Accumulated frequency",
        &format!("{}/accu_hist.svg", options.out_folder),
    )?;
    Ok(())
}

/// Saves one histogram figure with the threshold marked
///
/// The pore space lies below the threshold and the solid space above it.
fn save_histogram_figure(
    bins: &[f64],
    frequency: &[f64],
    threshold: f64,
    title: &str,
    ylabel: &str,
    path: &str,
) -> Result<(), StrError> {
    let top = frequency.iter().cloned().fold(f64::MIN, f64::max);
    if top <= 0.0 {
        return Err("histogram frequencies are all zero");
    }

    let mut bars = Barplot::new();
    bars.draw(&bins.to_vec(), &frequency.to_vec());

    let mut divider = Curve::new();
    divider.set_line_color("black").set_line_style("--");
    divider.draw(&vec![threshold, threshold], &vec![0.0, top]);

    let mut labels = Text::new();
    labels.set_align_horizontal("center");
    labels.draw(threshold / 2.0, top / 2.0, "pore\nspace");
    labels.draw(threshold + (256.0 - threshold) / 2.0, top / 2.0, "solid\nspace");

    let mut plot = Plot::new();
    plot.add(&bars)
        .add(&divider)
        .add(&labels)
        .set_title(title)
        .grid_and_labels("Greyscale level [0-255]", ylabel)
        .set_range(0.0, 256.0, 0.0, top)
        .save(path)?;
    Ok(())
}
