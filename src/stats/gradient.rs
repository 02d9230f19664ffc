use crate::StrError;

/// Computes the first derivative of sampled data on a possibly non-uniform grid
///
/// Interior points use the second-order accurate central scheme for unequal
/// spacing; the two boundary points use first-order one-sided differences.
/// The grid coordinates must be strictly increasing.
pub fn gradient(y: &[f64], x: &[f64]) -> Result<Vec<f64>, StrError> {
    let n = y.len();
    if n != x.len() {
        return Err("arrays must have the same length");
    }
    if n < 2 {
        return Err("at least two points are required");
    }
    for i in 1..n {
        if x[i] <= x[i - 1] {
            return Err("grid coordinates must be strictly increasing");
        }
    }
    let mut der = vec![0.0; n];
    der[0] = (y[1] - y[0]) / (x[1] - x[0]);
    der[n - 1] = (y[n - 1] - y[n - 2]) / (x[n - 1] - x[n - 2]);
    for i in 1..n - 1 {
        let hs = x[i] - x[i - 1];
        let hd = x[i + 1] - x[i];
        der[i] = (y[i + 1] * hs * hs + y[i] * (hd * hd - hs * hs) - y[i - 1] * hd * hd)
            / (hs * hd * (hd + hs));
    }
    Ok(der)
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::gradient;
    use russell_lab::array_approx_eq;

    #[test]
    fn gradient_works_on_uniform_grid() {
        // y = x^2 => dy/dx = 2x, exact for the quadratic interior scheme
        let x = [0.0, 1.0, 2.0, 3.0, 4.0];
        let y: Vec<f64> = x.iter().map(|v| v * v).collect();
        let der = gradient(&y, &x).unwrap();
        // boundaries are first-order one-sided
        array_approx_eq(&der, &[1.0, 2.0, 4.0, 6.0, 7.0], 1e-14);
    }

    #[test]
    fn gradient_works_on_non_uniform_grid() {
        // y = x^2 on an uneven grid; interior values remain exact
        let x = [0.0, 0.5, 2.0, 3.0];
        let y: Vec<f64> = x.iter().map(|v| v * v).collect();
        let der = gradient(&y, &x).unwrap();
        array_approx_eq(&der[1..3], &[1.0, 4.0], 1e-14);
    }

    #[test]
    fn gradient_captures_errors() {
        assert_eq!(
            gradient(&[1.0, 2.0], &[0.0]).err(),
            Some("arrays must have the same length")
        );
        assert_eq!(gradient(&[1.0], &[0.0]).err(), Some("at least two points are required"));
        assert_eq!(
            gradient(&[1.0, 2.0, 3.0], &[0.0, 2.0, 2.0]).err(),
            Some("grid coordinates must be strictly increasing")
        );
    }
}
