use crate::StrError;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

/// Implements a probability density histogram with unit-width bins
///
/// The bin edges span `floor(min)..=ceil(max)` with spacing one, so the
/// density values sum to one and can be used directly as sampling weights.
/// Values equal to the upper edge fall in the last bin.
#[derive(Clone, Debug)]
pub struct DensityHistogram {
    /// Bin edges (nbin + 1 values, unit spacing)
    edges: Vec<f64>,

    /// Number of values per bin
    counts: Vec<usize>,

    /// Normalized density per bin (sums to one)
    density: Vec<f64>,
}

impl DensityHistogram {
    /// Allocates a new histogram from raw values
    pub fn new(values: &[f64]) -> Result<Self, StrError> {
        if values.is_empty() {
            return Err("cannot compute a histogram of an empty array");
        }
        let mut vmin = f64::MAX;
        let mut vmax = f64::MIN;
        for v in values {
            if !v.is_finite() {
                return Err("cannot compute a histogram with non-finite values");
            }
            if *v < vmin {
                vmin = *v;
            }
            if *v > vmax {
                vmax = *v;
            }
        }
        let low = vmin.floor();
        let high = vmax.ceil();
        let nbin = usize::max((high - low) as usize, 1);
        let edges: Vec<f64> = (0..=nbin).map(|i| low + i as f64).collect();
        let mut counts = vec![0; nbin];
        for v in values {
            let mut index = (v - low) as usize;
            if index >= nbin {
                index = nbin - 1;
            }
            counts[index] += 1;
        }
        let total = values.len() as f64;
        let density = counts.iter().map(|c| *c as f64 / total).collect();
        Ok(DensityHistogram { edges, counts, density })
    }

    /// Returns the number of bins
    pub fn nbin(&self) -> usize {
        self.counts.len()
    }

    /// Returns the bin edges (nbin + 1 values)
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Returns the number of values per bin
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Returns the density per bin (sums to one for unit-width bins)
    pub fn density(&self) -> &[f64] {
        &self.density
    }

    /// Returns the sum of the density values
    pub fn density_sum(&self) -> f64 {
        self.density.iter().sum()
    }

    /// Returns the centers of all bins
    pub fn centers(&self) -> Vec<f64> {
        (0..self.nbin()).map(|i| 0.5 * (self.edges[i] + self.edges[i + 1])).collect()
    }

    /// Draws the left edge of a bin chosen with the density as weights
    ///
    /// This is the counterpart of sampling a histogram with weighted random
    /// choice: bins holding more of the original values are returned more
    /// often.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        // density values are non-negative and sum to one, so the
        // weighted index cannot fail here
        match WeightedIndex::new(&self.density) {
            Ok(dist) => self.edges[dist.sample(rng)],
            Err(_) => self.edges[0],
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::DensityHistogram;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use russell_lab::{approx_eq, array_approx_eq};

    #[test]
    fn new_works() {
        // values in [1.2, 4.9] => edges 1..=5, four unit bins
        let values = [1.2, 1.3, 2.5, 3.1, 3.2, 3.9, 4.9];
        let hist = DensityHistogram::new(&values).unwrap();
        assert_eq!(hist.nbin(), 4);
        array_approx_eq(hist.edges(), &[1.0, 2.0, 3.0, 4.0, 5.0], 1e-15);
        assert_eq!(hist.counts(), &[2, 1, 3, 1]);
        array_approx_eq(
            hist.density(),
            &[2.0 / 7.0, 1.0 / 7.0, 3.0 / 7.0, 1.0 / 7.0],
            1e-15,
        );
        approx_eq(hist.density_sum(), 1.0, 1e-15);
        array_approx_eq(&hist.centers(), &[1.5, 2.5, 3.5, 4.5], 1e-15);
    }

    #[test]
    fn value_on_upper_edge_falls_in_last_bin() {
        let values = [1.0, 2.0, 3.0];
        let hist = DensityHistogram::new(&values).unwrap();
        assert_eq!(hist.nbin(), 2);
        // 3.0 == upper edge => counted in the last bin
        assert_eq!(hist.counts(), &[1, 2]);
    }

    #[test]
    fn degenerate_range_yields_single_bin() {
        let values = [4.0, 4.0, 4.0];
        let hist = DensityHistogram::new(&values).unwrap();
        assert_eq!(hist.nbin(), 1);
        array_approx_eq(hist.edges(), &[4.0, 5.0], 1e-15);
        array_approx_eq(hist.density(), &[1.0], 1e-15);
    }

    #[test]
    fn new_captures_errors() {
        assert_eq!(
            DensityHistogram::new(&[]).err(),
            Some("cannot compute a histogram of an empty array")
        );
        assert_eq!(
            DensityHistogram::new(&[1.0, f64::NAN]).err(),
            Some("cannot compute a histogram with non-finite values")
        );
    }

    #[test]
    fn sample_follows_density() {
        // heavily skewed distribution: ~90% of mass in the first bin
        let mut values = vec![0.5; 90];
        values.extend(vec![1.5; 10]);
        let hist = DensityHistogram::new(&values).unwrap();
        let mut rng = StdRng::seed_from_u64(123);
        let n = 10_000;
        let mut first = 0;
        for _ in 0..n {
            let edge = hist.sample(&mut rng);
            assert!(edge == 0.0 || edge == 1.0);
            if edge == 0.0 {
                first += 1;
            }
        }
        let fraction = first as f64 / n as f64;
        assert!(fraction > 0.88 && fraction < 0.92);
    }
}
