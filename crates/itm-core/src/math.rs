//! Numerical primitives shared by the terrain and variability stages.

/// Inverse of the complementary standard normal distribution function,
/// Q⁻¹(q).
///
/// Rational approximation 26.2.23 from Abramowitz & Stegun, accurate to
/// |ε| < 4.5·10⁻⁴. Used to turn quantile fractions into normal deviates.
pub fn inv_complementary_cdf(q: f64) -> f64 {
    const C0: f64 = 2.515516;
    const C1: f64 = 0.802853;
    const C2: f64 = 0.010328;
    const D1: f64 = 1.432788;
    const D2: f64 = 0.189269;
    const D3: f64 = 0.001308;

    let x = if q > 0.5 { 1.0 - q } else { q };
    let t = (-2.0 * x.ln()).sqrt();
    let zeta = ((C2 * t + C1) * t + C0) / (((D3 * t + D2) * t + D1) * t + 1.0);
    let v = t - zeta;
    if q > 0.5 {
        -v
    } else {
        v
    }
}

/// Linear least-squares fit of a uniformly sampled height profile over the
/// window `[d_start_m, d_end_m]`.
///
/// Returns the fitted line evaluated at the *profile* endpoints (index 0 and
/// index N), not at the window edges. Window endpoints are half-weighted in
/// the sums. A window that collapses to nothing is widened by one sample on
/// each side, a quirk retained from the original FORTRAN.
pub fn linear_least_squares(
    heights: &[f64],
    resolution_m: f64,
    d_start_m: f64,
    d_end_m: f64,
) -> (f64, f64) {
    let n_int = heights.len() - 1;
    let xn = n_int as f64;

    let mut ja = ((d_start_m / resolution_m).max(0.0) as usize).min(n_int);
    let mut jb = n_int - (((xn - d_end_m / resolution_m).max(0.0) as usize).min(n_int));
    if jb <= ja {
        ja = ja.saturating_sub(1);
        jb = (jb + 1).min(n_int);
    }

    let n = jb - ja;
    if n == 0 {
        return (heights[0], heights[n_int]);
    }
    let nf = n as f64;

    let mut x = -0.5 * nf;
    let x_mid = jb as f64 + x;

    let mut mean = 0.5 * (heights[ja] + heights[jb]);
    let mut slope = 0.5 * (heights[ja] - heights[jb]) * x;
    let mut j = ja;
    for _ in 2..=n {
        j += 1;
        x += 1.0;
        mean += heights[j];
        slope += heights[j] * x;
    }
    mean /= nf;
    slope *= 12.0 / ((nf * nf + 2.0) * nf);

    (mean - slope * x_mid, mean + slope * (xn - x_mid))
}

/// The k-th largest value of a slice (1-based), used for the interdecile
/// range of detrended terrain.
pub fn kth_largest(values: &[f64], k: usize) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| b.total_cmp(a));
    sorted[k - 1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inv_cdf_symmetry_and_points() {
        assert!((inv_complementary_cdf(0.5)).abs() < 1e-12);
        assert!((inv_complementary_cdf(0.01) - 2.326785).abs() < 1e-5);
        assert!((inv_complementary_cdf(0.1) - 1.281729).abs() < 1e-5);
        assert!(
            (inv_complementary_cdf(0.9) + inv_complementary_cdf(0.1)).abs() < 1e-12,
            "deviates must be antisymmetric about the median"
        );
    }

    #[test]
    fn test_inv_cdf_accuracy_against_erfc() {
        // Q(2.0) = 0.0227501..., so the inverse at that quantile must give
        // back ~2.0 within the documented 4.5e-4 bound.
        let z = inv_complementary_cdf(0.022750131948);
        assert!((z - 2.0).abs() < 4.5e-4);
    }

    #[test]
    fn test_least_squares_recovers_line() {
        // Exact line 2 + 3i sampled at 1 km: the fit extrapolates to the
        // profile endpoints regardless of the window.
        let heights: Vec<f64> = (0..11).map(|i| 2.0 + 3.0 * i as f64).collect();
        let (y0, yn) = linear_least_squares(&heights, 1000.0, 1500.0, 8500.0);
        assert!((y0 - 2.0).abs() < 1e-9);
        assert!((yn - 32.0).abs() < 1e-9);
    }

    #[test]
    fn test_least_squares_single_interval_window() {
        let heights: Vec<f64> = (0..11).map(|i| 2.0 + 3.0 * i as f64).collect();
        let (y0, yn) = linear_least_squares(&heights, 1000.0, 4100.0, 4200.0);
        assert!((y0 - 2.0).abs() < 1e-9);
        assert!((yn - 32.0).abs() < 1e-9);
    }

    #[test]
    fn test_least_squares_collapsed_window_widens() {
        // Inverted window: collapses, then widens one sample each side.
        let heights: Vec<f64> = (0..11).map(|i| 2.0 + 3.0 * i as f64).collect();
        let (y0, yn) = linear_least_squares(&heights, 1000.0, 4900.0, 4000.0);
        assert!((y0 - 2.0).abs() < 1e-9);
        assert!((yn - 32.0).abs() < 1e-9);
    }

    #[test]
    fn test_kth_largest() {
        let v = [3.0, -1.0, 7.0, 0.5, 7.0, 2.0];
        assert_eq!(kth_largest(&v, 1), 7.0);
        assert_eq!(kth_largest(&v, 2), 7.0);
        assert_eq!(kth_largest(&v, 3), 3.0);
        assert_eq!(kth_largest(&v, 6), -1.0);
    }
}
