use capnet::{FractalCurve, StrError};
use plotpy::{Curve, Plot};
use structopt::StructOpt;

/// Phase name, line color, and marker per box-counting curve
const PHASES: [(&str, &str, &str); 3] = [
    ("pore", "red", "s"),
    ("surf", "green", "o"),
    ("rock", "blue", "v"),
];

/// Command line options
#[derive(StructOpt, Debug)]
#[structopt(name = "plot_fractal", about = "Box-counting fractal dimension plot")]
struct Options {
    /// Directory containing output files
    out_folder: String,
}

fn main() -> Result<(), StrError> {
    // parse options
    let options = Options::from_args();

    // allocate new plot (log x-axis must be set before `add`)
    let mut plot = Plot::new();
    plot.set_log_x(true);

    // read the box-counting file of each phase and fit the curve
    let mut size_min = f64::MAX;
    let mut size_max = f64::MIN;
    for (phase, color, marker) in &PHASES {
        let path = format!("{}/{}_frac_plot.dat", options.out_folder, phase);
        let curve = FractalCurve::read(&path)?;
        let dimension = curve.fractal_dimension()?;
        for size in &curve.sizes {
            size_min = f64::min(size_min, *size);
            size_max = f64::max(size_max, *size);
        }
        let mut line = Curve::new();
        line.set_label(phase)
            .set_line_color(color)
            .set_marker_style(marker);
        line.draw(&curve.sizes, &dimension);
        plot.add(&line);
    }

    // save figure
    plot.set_title("Box-counting fractal dimension")
        .grid_and_labels("box size", "fractal dimension")
        .legend()
        .set_range(size_min, size_max, 0.0, 3.1)
        .save(&format!("{}/frac_plot.svg", options.out_folder))?;
    Ok(())
}
