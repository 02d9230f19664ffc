use crate::{gradient, StrError};
use russell_lab::Matrix;
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Writes the porosity matching log (`porosity.txt`)
///
/// One `target,generated` row is appended per matching iteration.
pub struct PorosityTable {
    file: File,
}

impl PorosityTable {
    /// Creates the table file in the output folder and writes the banner
    pub fn create(out_dir: &str) -> Result<Self, StrError> {
        fs::create_dir_all(out_dir).map_err(|_| "cannot create output directory")?;
        let path = Path::new(out_dir).join("porosity.txt");
        let mut file = File::create(&path).map_err(|_| "cannot create porosity file")?;
        writeln!(&mut file, "###################################################").map_err(|_| "cannot write porosity file")?;
        writeln!(&mut file, "      Target Porosity: Rock sample centerlines     ").map_err(|_| "cannot write porosity file")?;
        writeln!(&mut file, "###################################################").map_err(|_| "cannot write porosity file")?;
        writeln!(&mut file, "Target Porosity     Capillary Network Porosity     ").map_err(|_| "cannot write porosity file")?;
        Ok(PorosityTable { file })
    }

    /// Appends one target/generated porosity pair
    pub fn append(&mut self, target: f64, generated: f64) -> Result<(), StrError> {
        writeln!(&mut self.file, "{},{}", target, generated).map_err(|_| "cannot write porosity file")?;
        Ok(())
    }
}

/// Holds the per-capillary statistics produced by the skeletonization pipeline
///
/// Read from `centerlines.stat`, a comma-separated table whose first three
/// columns are length, tortuosity, and average diameter (voxel units).
/// Entries with non-positive length are dropped on read.
pub struct CenterlineStat {
    pub length: Vec<f64>,
    pub tortuosity: Vec<f64>,
    pub diameter: Vec<f64>,
}

impl CenterlineStat {
    /// Reads a comma-separated statistics file, filtering invalid entries
    pub fn read<P>(full_path: &P) -> Result<Self, StrError>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path).to_path_buf();
        let contents = fs::read_to_string(&path).map_err(|_| "cannot open statistics file")?;
        let mut length = Vec::new();
        let mut tortuosity = Vec::new();
        let mut diameter = Vec::new();
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let columns: Vec<&str> = line.split(',').collect();
            if columns.len() < 3 {
                return Err("statistics file must have at least three columns");
            }
            let l: f64 = columns[0].trim().parse().map_err(|_| "cannot parse statistics value")?;
            let t: f64 = columns[1].trim().parse().map_err(|_| "cannot parse statistics value")?;
            let d: f64 = columns[2].trim().parse().map_err(|_| "cannot parse statistics value")?;
            if l > 0.0 {
                length.push(l);
                tortuosity.push(t);
                diameter.push(d);
            }
        }
        Ok(CenterlineStat {
            length,
            tortuosity,
            diameter,
        })
    }

    /// Returns the number of (valid) capillaries
    pub fn len(&self) -> usize {
        self.length.len()
    }

    /// Returns true if no valid capillary was read
    pub fn is_empty(&self) -> bool {
        self.length.is_empty()
    }

    /// Converts lengths and diameters from voxel units to micrometers
    pub fn scale_to_micrometers(&mut self, voxel_size: f64) {
        let factor = voxel_size / 1.0e-6;
        for value in self.length.iter_mut() {
            *value *= factor;
        }
        for value in self.diameter.iter_mut() {
            *value *= factor;
        }
    }
}

/// Holds the greyscale histogram of a scanned sample (`histogram.dat`)
///
/// A whitespace-separated table with one row per greyscale level carrying the
/// level, the normalized frequency, and the accumulated frequency.
pub struct GreyscaleHistogram {
    pub bins: Vec<f64>,
    pub normalized: Vec<f64>,
    pub accumulated: Vec<f64>,
}

impl GreyscaleHistogram {
    /// Reads a whitespace-separated histogram file
    pub fn read<P>(full_path: &P) -> Result<Self, StrError>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let matrix = Matrix::from_text_file(full_path)?;
        let (nrow, ncol) = matrix.dims();
        if ncol < 3 {
            return Err("histogram file must have three columns");
        }
        if nrow < 1 {
            return Err("histogram file is empty");
        }
        let mut bins = Vec::with_capacity(nrow);
        let mut normalized = Vec::with_capacity(nrow);
        let mut accumulated = Vec::with_capacity(nrow);
        for i in 0..nrow {
            bins.push(matrix.get(i, 0));
            normalized.push(matrix.get(i, 1));
            accumulated.push(matrix.get(i, 2));
        }
        Ok(GreyscaleHistogram {
            bins,
            normalized,
            accumulated,
        })
    }
}

/// Holds one phase of a box-counting analysis (`<phase>_frac_plot.dat`)
///
/// A whitespace-separated table of box size and box count.
pub struct FractalCurve {
    pub sizes: Vec<f64>,
    pub counts: Vec<f64>,
}

impl FractalCurve {
    /// Reads a whitespace-separated box-counting file
    pub fn read<P>(full_path: &P) -> Result<Self, StrError>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let matrix = Matrix::from_text_file(full_path)?;
        let (nrow, ncol) = matrix.dims();
        if ncol < 2 {
            return Err("box-counting file must have two columns");
        }
        if nrow < 2 {
            return Err("box-counting file must have at least two rows");
        }
        let mut sizes = Vec::with_capacity(nrow);
        let mut counts = Vec::with_capacity(nrow);
        for i in 0..nrow {
            sizes.push(matrix.get(i, 0));
            counts.push(matrix.get(i, 1));
        }
        Ok(FractalCurve { sizes, counts })
    }

    /// Computes the fractal dimension curve `-d ln(count) / d ln(size)`
    ///
    /// Both logarithmic derivatives are taken with respect to the box size,
    /// so the result is the local box-counting dimension per size.
    pub fn fractal_dimension(&self) -> Result<Vec<f64>, StrError> {
        let ln_count: Vec<f64> = self.counts.iter().map(|c| c.ln()).collect();
        let ln_size: Vec<f64> = self.sizes.iter().map(|s| s.ln()).collect();
        let num = gradient(&ln_count, &self.sizes)?;
        let den = gradient(&ln_size, &self.sizes)?;
        Ok(num.iter().zip(den.iter()).map(|(a, b)| -a / b).collect())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{CenterlineStat, FractalCurve, GreyscaleHistogram, PorosityTable};
    use russell_lab::{approx_eq, array_approx_eq};
    use std::fs;

    #[test]
    fn porosity_table_works() {
        let out_dir = "/tmp/capnet/test_porosity_table";
        let mut table = PorosityTable::create(out_dir).unwrap();
        table.append(0.25, 0.3).unwrap();
        table.append(0.25, 0.24).unwrap();
        drop(table);
        let contents = fs::read_to_string(format!("{}/porosity.txt", out_dir)).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with("###"));
        assert_eq!(lines[1].trim(), "Target Porosity: Rock sample centerlines");
        assert!(lines[2].starts_with("###"));
        assert!(lines[3].starts_with("Target Porosity"));
        assert_eq!(lines[4], "0.25,0.3");
        assert_eq!(lines[5], "0.25,0.24");
    }

    #[test]
    fn centerline_stat_read_works() {
        let path = "/tmp/capnet/test_centerlines.stat";
        fs::create_dir_all("/tmp/capnet").unwrap();
        // second entry has non-positive length and must be dropped;
        // the fourth column is ignored
        fs::write(path, "10.0,1.2,3.0,99\n-1.0,1.0,1.0,99\n20.0,1.5,4.0,99\n").unwrap();
        let mut stat = CenterlineStat::read(path).unwrap();
        assert_eq!(stat.len(), 2);
        array_approx_eq(&stat.length, &[10.0, 20.0], 1e-15);
        array_approx_eq(&stat.tortuosity, &[1.2, 1.5], 1e-15);
        array_approx_eq(&stat.diameter, &[3.0, 4.0], 1e-15);
        stat.scale_to_micrometers(2.0e-6);
        array_approx_eq(&stat.length, &[20.0, 40.0], 1e-15);
        array_approx_eq(&stat.diameter, &[6.0, 8.0], 1e-15);
        // tortuosity is a ratio and keeps its value
        array_approx_eq(&stat.tortuosity, &[1.2, 1.5], 1e-15);
    }

    #[test]
    fn centerline_stat_captures_errors() {
        assert_eq!(
            CenterlineStat::read("/tmp/capnet/__no_such__.stat").err(),
            Some("cannot open statistics file")
        );
        let path = "/tmp/capnet/test_centerlines_bad.stat";
        fs::write(path, "1.0,2.0\n").unwrap();
        assert_eq!(
            CenterlineStat::read(path).err(),
            Some("statistics file must have at least three columns")
        );
        fs::write(path, "1.0,abc,2.0\n").unwrap();
        assert_eq!(
            CenterlineStat::read(path).err(),
            Some("cannot parse statistics value")
        );
    }

    #[test]
    fn greyscale_histogram_read_works() {
        let path = "/tmp/capnet/test_histogram.dat";
        fs::create_dir_all("/tmp/capnet").unwrap();
        fs::write(path, "0 0.5 0.5\n1 0.3 0.8\n2 0.2 1.0\n").unwrap();
        let histogram = GreyscaleHistogram::read(path).unwrap();
        array_approx_eq(&histogram.bins, &[0.0, 1.0, 2.0], 1e-15);
        array_approx_eq(&histogram.normalized, &[0.5, 0.3, 0.2], 1e-15);
        array_approx_eq(&histogram.accumulated, &[0.5, 0.8, 1.0], 1e-15);
    }

    #[test]
    fn greyscale_histogram_captures_errors() {
        let path = "/tmp/capnet/test_histogram_bad.dat";
        fs::create_dir_all("/tmp/capnet").unwrap();
        fs::write(path, "0 0.5\n1 0.3\n").unwrap();
        assert_eq!(
            GreyscaleHistogram::read(path).err(),
            Some("histogram file must have three columns")
        );
    }

    #[test]
    fn fractal_curve_works() {
        let path = "/tmp/capnet/test_frac_plot.dat";
        fs::create_dir_all("/tmp/capnet").unwrap();
        // count = size^-2 => dimension = 2 everywhere
        fs::write(path, "1 1\n2 0.25\n4 0.0625\n8 0.015625\n").unwrap();
        let curve = FractalCurve::read(path).unwrap();
        let dimension = curve.fractal_dimension().unwrap();
        for value in &dimension {
            approx_eq(*value, 2.0, 1e-12);
        }
    }

    #[test]
    fn fractal_curve_captures_errors() {
        let path = "/tmp/capnet/test_frac_bad.dat";
        fs::create_dir_all("/tmp/capnet").unwrap();
        fs::write(path, "1\n2\n").unwrap();
        assert_eq!(
            FractalCurve::read(path).err(),
            Some("box-counting file must have two columns")
        );
    }
}
