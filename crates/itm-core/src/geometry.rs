//! Path geometry: the call-scoped record every loss model reads from.
//!
//! In point-to-point mode the geometry is derived from the terrain profile:
//! a horizon scan from both terminals, effective heights from a least-squares
//! fit of the foreground terrain, and smooth-earth adjustments when the path
//! is well within line-of-sight. In area mode no profile exists and the same
//! quantities are synthesized from the siting criteria and Δh.

use num_complex::Complex64;

use crate::error::Warnings;
use crate::params::{ItmParams, Polarization, SitingCriteria};
use crate::terrain::{self, TerrainProfile};
use crate::EARTH_CURVATURE_PER_M;

/// Everything the regime models need to know about one path.
///
/// Built once per prediction by [`PathGeometry::from_profile`] or
/// [`PathGeometry::from_area`], then treated as immutable.
#[derive(Debug, Clone, PartialEq)]
pub struct PathGeometry {
    /// Carrier frequency, MHz.
    pub frequency_mhz: f64,
    /// Structural terminal heights above ground, meters (tx, rx).
    pub structural_height_m: [f64; 2],
    /// Effective terminal heights, meters (tx, rx).
    pub effective_height_m: [f64; 2],
    /// Horizon distances, meters (tx, rx).
    pub horizon_distance_m: [f64; 2],
    /// Signed horizon elevation angles, radians (tx, rx).
    pub horizon_angle_rad: [f64; 2],
    /// Great-circle path distance, meters.
    pub path_distance_m: f64,
    /// Terrain irregularity parameter Δh, meters.
    pub delta_h_m: f64,
    /// Surface refractivity at the path's mean elevation, N-units.
    pub surface_refractivity_n: f64,
    /// Effective earth curvature, 1/m.
    pub effective_curvature_per_m: f64,
    /// Complex surface transfer impedance of the ground.
    pub ground_impedance: Complex64,
}

impl PathGeometry {
    /// Effective earth radius, in meters.
    pub fn effective_earth_radius_m(&self) -> f64 {
        1.0 / self.effective_curvature_per_m
    }

    /// Derive the geometry from a terrain profile (point-to-point mode).
    pub fn from_profile(params: &ItmParams, profile: &TerrainProfile) -> Self {
        let heights = profile.heights_m();
        let n = profile.intervals();
        let s = profile.resolution_m();
        let d = profile.distance_m();
        let h = [params.tx_height_m, params.rx_height_m];

        let (n_s, gamma_e, z_g) =
            environment(params, profile.interior_mean_elevation_m());
        let a_e = 1.0 / gamma_e;

        // Terrain-limited horizons from both terminals.
        let (mut theta, mut d_hzn) = scan_horizons(heights, s, d, &h, gamma_e);

        // Foreground windows: consideration of terrain starts about fifteen
        // tower heights out, capped at a tenth of the path.
        let x_start = (15.0 * h[0]).min(0.1 * d);
        let x_end = d - (15.0 * h[1]).min(0.1 * d);

        let delta_h_m = terrain::delta_h(profile, x_start, x_end);

        let mut h_e = [0.0; 2];
        if d_hzn[0] + d_hzn[1] > 1.5 * d {
            // Well within line-of-sight: effective heights come from a fit
            // of the whole interior, horizons from the smooth-earth relation.
            let (y_tx, y_rx) = crate::math::linear_least_squares(heights, s, x_start, x_end);
            h_e[0] = h[0] + (heights[0] - y_tx).abs();
            h_e[1] = h[1] + (heights[n] - y_rx).abs();

            for i in 0..2 {
                d_hzn[i] = smooth_earth_horizon(h_e[i], a_e, delta_h_m);
            }

            // A rounded horizon or double obstruction inside the path:
            // stretch the effective heights until the horizons span it.
            let combined = d_hzn[0] + d_hzn[1];
            if combined <= d {
                let scale = (d / combined) * (d / combined);
                for i in 0..2 {
                    h_e[i] *= scale;
                    d_hzn[i] = smooth_earth_horizon(h_e[i], a_e, delta_h_m);
                }
            }

            for i in 0..2 {
                theta[i] = smooth_earth_horizon_angle(h_e[i], d_hzn[i], a_e, delta_h_m);
            }
        } else {
            // Trans-horizon: fit each terminal's foreground up to 90% of its
            // horizon distance.
            let (y_tx, _) = crate::math::linear_least_squares(heights, s, x_start, 0.9 * d_hzn[0]);
            let (_, y_rx) =
                crate::math::linear_least_squares(heights, s, d - 0.9 * d_hzn[1], x_end);
            h_e[0] = h[0] + (heights[0] - y_tx).abs();
            h_e[1] = h[1] + (heights[n] - y_rx).abs();
        }

        Self {
            frequency_mhz: params.frequency_mhz,
            structural_height_m: h,
            effective_height_m: h_e,
            horizon_distance_m: d_hzn,
            horizon_angle_rad: theta,
            path_distance_m: d,
            delta_h_m,
            surface_refractivity_n: n_s,
            effective_curvature_per_m: gamma_e,
            ground_impedance: z_g,
        }
    }

    /// Synthesize the geometry from siting criteria (area mode).
    pub fn from_area(
        params: &ItmParams,
        tx_siting: SitingCriteria,
        rx_siting: SitingCriteria,
        distance_m: f64,
        delta_h_m: f64,
    ) -> Self {
        let h = [params.tx_height_m, params.rx_height_m];
        let (n_s, gamma_e, z_g) = environment(params, 0.0);
        let a_e = 1.0 / gamma_e;

        let mut h_e = [0.0; 2];
        let mut d_hzn = [0.0; 2];
        let mut theta = [0.0; 2];
        for (i, siting) in [tx_siting, rx_siting].into_iter().enumerate() {
            h_e[i] = match siting {
                SitingCriteria::Random => h[i],
                SitingCriteria::Careful | SitingCriteria::VeryCareful => {
                    let mut boost = if siting == SitingCriteria::Careful {
                        4.0
                    } else {
                        9.0
                    };
                    if h[i] < 5.0 {
                        boost *= (0.3141593 * h[i]).sin();
                    }
                    h[i] + (1.0 + boost)
                        * (-(2.0 * h[i] / delta_h_m.max(1.0e-3)).min(20.0)).exp()
                }
            };
            d_hzn[i] = smooth_earth_horizon(h_e[i], a_e, delta_h_m);
            theta[i] = smooth_earth_horizon_angle(h_e[i], d_hzn[i], a_e, delta_h_m);
        }

        Self {
            frequency_mhz: params.frequency_mhz,
            structural_height_m: h,
            effective_height_m: h_e,
            horizon_distance_m: d_hzn,
            horizon_angle_rad: theta,
            path_distance_m: distance_m,
            delta_h_m,
            surface_refractivity_n: n_s,
            effective_curvature_per_m: gamma_e,
            ground_impedance: z_g,
        }
    }

    /// Range checks on derived quantities. None of these abort a
    /// prediction; they flag results the model was not validated for.
    pub fn range_warnings(&self) -> Warnings {
        let mut w = Warnings::empty();
        let a_e = self.effective_earth_radius_m();

        if self.horizon_angle_rad[0].abs() > 200.0e-3 {
            w |= Warnings::TX_HORIZON_ANGLE;
        }
        if self.horizon_angle_rad[1].abs() > 200.0e-3 {
            w |= Warnings::RX_HORIZON_ANGLE;
        }

        let smooth = [
            (2.0 * self.effective_height_m[0] * a_e).sqrt(),
            (2.0 * self.effective_height_m[1] * a_e).sqrt(),
        ];
        if self.horizon_distance_m[0] < 0.1 * smooth[0] {
            w |= Warnings::TX_HORIZON_DISTANCE_LOW;
        }
        if self.horizon_distance_m[0] > 3.0 * smooth[0] {
            w |= Warnings::TX_HORIZON_DISTANCE_HIGH;
        }
        if self.horizon_distance_m[1] < 0.1 * smooth[1] {
            w |= Warnings::RX_HORIZON_DISTANCE_LOW;
        }
        if self.horizon_distance_m[1] > 3.0 * smooth[1] {
            w |= Warnings::RX_HORIZON_DISTANCE_HIGH;
        }

        if !(250.0..=400.0).contains(&self.surface_refractivity_n) {
            w |= Warnings::SURFACE_REFRACTIVITY;
        }
        if !(4.0e6..=13_333_333.0).contains(&a_e) {
            w |= Warnings::EFFECTIVE_EARTH;
        }
        if self.ground_impedance.re <= self.ground_impedance.im.abs() {
            w |= Warnings::GROUND_IMPEDANCE;
        }

        let min_distance =
            (self.effective_height_m[0] - self.effective_height_m[1]).abs() / 0.2;
        if self.path_distance_m < min_distance {
            w |= Warnings::PATH_DISTANCE_SMALL_1;
        }
        if self.path_distance_m < 1.0e3 {
            w |= Warnings::PATH_DISTANCE_SMALL_2;
        }
        if self.path_distance_m > 1.0e6 {
            w |= Warnings::PATH_DISTANCE_BIG_1;
        }
        if self.path_distance_m > 2.0e6 {
            w |= Warnings::PATH_DISTANCE_BIG_2;
        }
        w
    }
}

/// Free-space basic transmission loss, in dB.
pub fn free_space_loss_db(distance_m: f64, frequency_mhz: f64) -> f64 {
    32.45 + 20.0 * frequency_mhz.log10() + 20.0 * (distance_m * 1.0e-3).log10()
}

/// Surface refractivity, effective earth curvature, and ground impedance for
/// the given mean path elevation.
fn environment(params: &ItmParams, mean_elevation_m: f64) -> (f64, f64, Complex64) {
    // Scale sea-level refractivity to the surface value at the path's mean
    // elevation, TN-101 Eq 4.3.
    let n_s = if mean_elevation_m <= 0.0 {
        params.refractivity_n
    } else {
        params.refractivity_n * (-mean_elevation_m / 9460.0).exp()
    };

    // TN-101 Eq 4.4, reworked.
    let gamma_e = EARTH_CURVATURE_PER_M * (1.0 - 0.04665 * (n_s / 179.3).exp());

    let eps_c = Complex64::new(
        params.permittivity,
        18.0e3 * params.conductivity_s_per_m / params.frequency_mhz,
    );
    let mut z_g = (eps_c - 1.0).sqrt();
    if params.polarization == Polarization::Vertical {
        z_g /= eps_c;
    }

    (n_s, gamma_e, z_g)
}

/// Smooth-earth horizon distance for an effective height, shortened over
/// rough terrain.
fn smooth_earth_horizon(h_e_m: f64, a_e_m: f64, delta_h_m: f64) -> f64 {
    (2.0 * h_e_m * a_e_m).sqrt() * (-0.07 * (delta_h_m / h_e_m.max(5.0)).sqrt()).exp()
}

/// Horizon elevation angle consistent with the smooth-earth horizon distance.
fn smooth_earth_horizon_angle(h_e_m: f64, d_hzn_m: f64, a_e_m: f64, delta_h_m: f64) -> f64 {
    let q = (2.0 * h_e_m * a_e_m).sqrt();
    (0.65 * delta_h_m * (q / d_hzn_m - 1.0) - 2.0 * h_e_m) / q
}

/// Walk the profile from both ends, promoting each terminal's horizon to any
/// sample that subtends a larger elevation angle.
fn scan_horizons(
    heights: &[f64],
    resolution_m: f64,
    distance_m: f64,
    h: &[f64; 2],
    gamma_e: f64,
) -> ([f64; 2], [f64; 2]) {
    let n = heights.len() - 1;
    let z_tx = heights[0] + h[0];
    let z_rx = heights[n] + h[1];
    let half_curve = gamma_e / 2.0;

    // Line-of-sight angles to the far terminal, TN-101 Eq 6.15.
    let mut theta = [
        (z_rx - z_tx) / distance_m - half_curve * distance_m,
        -(z_rx - z_tx) / distance_m - half_curve * distance_m,
    ];
    let mut d_hzn = [distance_m, distance_m];

    let mut sa = 0.0;
    let mut sb = distance_m;
    for &height in &heights[1..n] {
        sa += resolution_m;
        sb -= resolution_m;

        let angle_tx = (height - z_tx) / sa - half_curve * sa;
        if angle_tx > theta[0] {
            theta[0] = angle_tx;
            d_hzn[0] = sa;
        }
        let angle_rx = (height - z_rx) / sb - half_curve * sb;
        if angle_rx > theta[1] {
            theta[1] = angle_rx;
            d_hzn[1] = sb;
        }
    }

    (theta, d_hzn)
}
