use capnet::{CenterlineStat, StrError};
use plotpy::{Curve, Plot};
use std::cmp::Ordering;
use structopt::StructOpt;

/// Command line options
#[derive(StructOpt, Debug)]
#[structopt(name = "plot_stats", about = "Centerline statistics")]
struct Options {
    /// Directory containing output files
    odir: String,

    /// Voxel size [m]
    #[structopt(long)]
    voxel: f64,
}

fn main() -> Result<(), StrError> {
    // parse options
    let options = Options::from_args();

    // load and re-format input file; convert voxel units to micrometers
    let path = format!("{}/centerlines.stat", options.odir);
    let mut stat = CenterlineStat::read(&path)?;
    if stat.is_empty() {
        return Err("statistics file has no valid entries");
    }
    stat.scale_to_micrometers(options.voxel);

    // save length vs. tortuosity plot
    save_scatter(
        &stat.length,
        &stat.tortuosity,
        &stat.diameter,
        "Capillary length [um]",
        "Capillary tortuosity",
        "diameter [um]",
        true,
        false,
        &format!("{}/length_tort.svg", options.odir),
    )?;

    // save diameter vs. tortuosity plot
    save_scatter(
        &stat.diameter,
        &stat.tortuosity,
        &stat.length,
        "Average capillary diameter [um]",
        "Capillary tortuosity",
        "length [um]",
        true,
        false,
        &format!("{}/diam_tort.svg", options.odir),
    )?;

    // save diameter vs. length plot
    save_scatter(
        &stat.diameter,
        &stat.length,
        &stat.tortuosity,
        "Average capillary diameter [um]",
        "Capillary length [um]",
        "tortuosity",
        true,
        true,
        &format!("{}/diam_length.svg", options.odir),
    )?;
    Ok(())
}

/// Saves a scatter plot with markers grouped by terciles of a third variable
fn save_scatter(
    x: &[f64],
    y: &[f64],
    color_by: &[f64],
    xlabel: &str,
    ylabel: &str,
    color_label: &str,
    log_x: bool,
    log_y: bool,
    path: &str,
) -> Result<(), StrError> {
    // tercile thresholds of the coloring variable
    let mut sorted = color_by.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let n = sorted.len();
    let t1 = sorted[n / 3];
    let t2 = sorted[(2 * n) / 3];

    // log scales must be set before `add`
    let mut plot = Plot::new();
    plot.set_log_x(log_x).set_log_y(log_y);

    let groups = [
        (format!("low {}", color_label), "#4c72b0"),
        (format!("mid {}", color_label), "#55a868"),
        (format!("high {}", color_label), "#c44e52"),
    ];
    for (index, (label, color)) in groups.iter().enumerate() {
        let mut gx = Vec::new();
        let mut gy = Vec::new();
        for i in 0..x.len() {
            let selected = match index {
                0 => color_by[i] < t1,
                1 => color_by[i] >= t1 && color_by[i] < t2,
                _ => color_by[i] >= t2,
            };
            if selected {
                gx.push(x[i]);
                gy.push(y[i]);
            }
        }
        if gx.is_empty() {
            continue;
        }
        let mut markers = Curve::new();
        markers
            .set_label(label)
            .set_line_style("None")
            .set_marker_style("o")
            .set_marker_color(color);
        markers.draw(&gx, &gy);
        plot.add(&markers);
    }

    // save figure
    plot.grid_and_labels(xlabel, ylabel).legend().save(path)?;
    Ok(())
}
