//! Troposcatter loss per NBS TN-101 chapter 9: the frequency gain function
//! H₀, the attenuation function F(θd), and the scatter efficiency that ties
//! them together.

use crate::geometry::PathGeometry;
use crate::{MAX_LOSS_DB, WAVE_TO_MHZ_TERM};

/// Curve-fit table for the frequency gain function, one entry per integer
/// scatter efficiency 1..=5.
const H0_A: [f64; 5] = [25.0, 80.0, 177.0, 395.0, 705.0];
const H0_B: [f64; 5] = [24.0, 45.0, 68.0, 80.0, 105.0];

fn h0_curve(index: usize, r: f64) -> f64 {
    let inv_sq = 1.0 / (r * r);
    10.0 * (1.0 + H0_A[index] * inv_sq * inv_sq + H0_B[index] * inv_sq).log10()
}

/// Frequency gain function H₀(r, η_s), in dB. `eta_s` must already be
/// clamped to 1..=5; non-integer values interpolate between adjacent curves.
pub fn frequency_gain(r: f64, eta_s: f64) -> f64 {
    let index = eta_s as usize;
    let fraction = eta_s - index as f64;
    let gain = h0_curve(index - 1, r);
    if fraction != 0.0 {
        (1.0 - fraction) * gain + fraction * h0_curve(index, r)
    } else {
        gain
    }
}

/// Attenuation function F(θd), in dB, with coefficients selected by the
/// θd product in meters.
pub fn attenuation_function(theta_d_m: f64) -> f64 {
    let (a, b, c) = if theta_d_m <= 10.0e3 {
        (133.4, 0.332e-3, -10.0)
    } else if theta_d_m <= 70.0e3 {
        (104.6, 0.212e-3, -2.5)
    } else {
        (71.8, 0.157e-3, 5.0)
    };
    a + b * theta_d_m + c * theta_d_m.log10()
}

/// Troposcatter loss at `distance_m`, in dB.
///
/// `h0_prior` threads the frequency gain between successive evaluations: the
/// caller seeds it with -1, evaluates the farther distance first, and any
/// later evaluation that would push H₀ above 15 dB falls back to the prior
/// value. A prior already above 15 dB skips the H₀ computation entirely.
/// Returns the 999 dB sentinel when the geometry puts both terminals outside
/// the region where the scatter integral is defined.
pub fn troposcatter_loss_db(
    geom: &PathGeometry,
    distance_m: f64,
    theta_los_rad: f64,
    h0_prior: &mut f64,
) -> f64 {
    let a_e = geom.effective_earth_radius_m();
    let wave_number = geom.frequency_mhz / WAVE_TO_MHZ_TERM;

    let mut h0 = *h0_prior;
    if *h0_prior <= 15.0 {
        let mut horizon_delta = geom.horizon_distance_m[0] - geom.horizon_distance_m[1];
        let mut height_ratio = geom.effective_height_m[1] / geom.effective_height_m[0];
        if horizon_delta < 0.0 {
            horizon_delta = -horizon_delta;
            height_ratio = 1.0 / height_ratio;
        }

        let theta = geom.horizon_angle_rad[0] + geom.horizon_angle_rad[1] + distance_m / a_e;

        // TN-101 Eq 9.4a.
        let r_tx = 2.0 * wave_number * theta * geom.effective_height_m[0];
        let r_rx = 2.0 * wave_number * theta * geom.effective_height_m[1];

        // Below 0.2 on both sides the scatter function is undefined.
        if r_tx < 0.2 && r_rx < 0.2 {
            return MAX_LOSS_DB;
        }

        let mut symmetry = (distance_m - horizon_delta) / (distance_m + horizon_delta);
        let skew = (height_ratio / symmetry).clamp(0.1, 10.0);
        symmetry = symmetry.max(0.1);

        // Cross-over height, TN-101 Eq 9.3b.
        let h_cross =
            (distance_m - horizon_delta) * (distance_m + horizon_delta) * theta * 0.25
                / distance_m;

        // Scattering efficiency, TN-101 Eq 9.3a; scale heights 1.7556 km
        // and 8 km.
        let n_s = geom.surface_refractivity_n;
        let eta_s = (h_cross / 1.7556e3)
            * (1.0
                + (0.031 - n_s * 2.32e-3 + n_s * n_s * 5.67e-6)
                    * (-(h_cross / 8.0e3).min(1.7).powi(6)).exp());
        let eta_s = eta_s.clamp(1.0, 5.0);

        let mean_gain = 0.5 * (frequency_gain(r_tx, eta_s) + frequency_gain(r_rx, eta_s));
        // Asymmetry correction, TN-101 Eq 9.5, capped at the mean gain.
        let correction =
            6.0 * (0.6 - eta_s.log10()) * symmetry.log10() * skew.log10();
        h0 = (mean_gain + correction.min(mean_gain)).max(0.0);

        // A late H0 above 15 dB is replaced by the value found farther out.
        if h0 > 15.0 && *h0_prior >= 0.0 {
            h0 = *h0_prior;
        }
        *h0_prior = h0;
    }

    let theta_nlos = distance_m / a_e - theta_los_rad;
    let theta_d = theta_nlos * distance_m;

    attenuation_function(theta_d)
        + 10.0 * (geom.frequency_mhz * theta_nlos.powi(4)).log10()
        - 0.1 * (geom.surface_refractivity_n - 301.0) * (-theta_d / 40.0e3).exp()
        + h0
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;

    fn scatter_geom(frequency_mhz: f64, he: f64, the: f64) -> PathGeometry {
        PathGeometry {
            frequency_mhz,
            structural_height_m: [he, he],
            effective_height_m: [he, he],
            horizon_distance_m: [5_000.0, 5_000.0],
            horizon_angle_rad: [the, the],
            path_distance_m: 400_000.0,
            delta_h_m: 0.0,
            surface_refractivity_n: 301.0,
            effective_curvature_per_m: 1.0 / 8.5e6,
            ground_impedance: Complex64::new(3.7, 0.1),
        }
    }

    #[test]
    fn test_frequency_gain_table() {
        assert!((frequency_gain(1.0, 1.0) - 16.9897).abs() < 1e-3);
        // Interpolated between curves 2 and 3.
        assert!((frequency_gain(1.0, 2.5) - 22.4565).abs() < 1e-3);
        // Top curve, larger r.
        assert!((frequency_gain(5.0, 5.0) - 8.0127).abs() < 1e-3);
    }

    #[test]
    fn test_attenuation_function_bins() {
        assert!((attenuation_function(5.0e3) - 98.0703).abs() < 1e-3);
        assert!((attenuation_function(30.0e3) - 99.7672).abs() < 1e-3);
        assert!((attenuation_function(200.0e3) - 129.7051).abs() < 1e-3);
    }

    #[test]
    fn test_h0_prior_substitution_when_crossing_15_db() {
        // At the farther distance H0 computes to ~14.14 dB; the nearer
        // evaluation alone would give ~16.89 dB, crossing the 15 dB gate,
        // and must be replaced by the farther value.
        let geom = scatter_geom(30.0, 30.0, 0.001);
        let theta_los = -0.002;

        let mut unguarded = -999.0;
        troposcatter_loss_db(&geom, 210_000.0, theta_los, &mut unguarded);
        assert!((unguarded - 16.893_977).abs() < 1e-4);

        let mut prior = -1.0;
        let a6 = troposcatter_loss_db(&geom, 410_000.0, theta_los, &mut prior);
        assert!((prior - 14.141_996).abs() < 1e-4);
        assert!((a6 - 75.135_537).abs() < 1e-4);

        let a5 = troposcatter_loss_db(&geom, 210_000.0, theta_los, &mut prior);
        assert!((prior - 14.141_996).abs() < 1e-4, "prior replaced the spike");
        assert!((a5 - 63.751_158).abs() < 1e-4);
    }

    #[test]
    fn test_prior_above_15_skips_recompute() {
        let geom = scatter_geom(100.0, 50.0, 0.004);
        let mut prior = 20.0;
        let loss = troposcatter_loss_db(&geom, 300_000.0, -0.008, &mut prior);
        // Prior untouched, and baked into the returned loss.
        assert_eq!(prior, 20.0);
        let mut prior_low = 19.0;
        let loss_low = troposcatter_loss_db(&geom, 300_000.0, -0.008, &mut prior_low);
        assert!((loss - loss_low - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_undefined_region_returns_max_loss() {
        // Tiny wavenumber-height products leave both r parameters under 0.2.
        let geom = scatter_geom(20.0, 0.5, 1.0e-5);
        let mut prior = -1.0;
        let loss = troposcatter_loss_db(&geom, 30_000.0, -2.0e-5, &mut prior);
        assert_eq!(loss, MAX_LOSS_DB);
        assert_eq!(prior, -1.0, "prior left untouched");
    }
}
