//! Line-of-sight loss: a two-ray model with a complex ground reflection,
//! blended against the extended diffraction line.

use num_complex::Complex64;

use crate::geometry::PathGeometry;
use crate::terrain::{sigma_h, terrain_roughness};
use crate::WAVE_TO_MHZ_TERM;

/// Line-of-sight loss at `distance_m`, in dB.
///
/// `diffraction_slope` and `diffraction_intercept` describe the extended
/// diffraction line A = m·d + A₀ the two-ray result is blended with; the
/// blend favors the two-ray model over smooth terrain and short paths.
pub fn line_of_sight_loss_db(
    geom: &PathGeometry,
    distance_m: f64,
    diffraction_slope: f64,
    diffraction_intercept: f64,
    d_sml_m: f64,
) -> f64 {
    let sigma = sigma_h(terrain_roughness(distance_m, geom.delta_h_m));
    let wave_number = geom.frequency_mhz / WAVE_TO_MHZ_TERM;

    let height_sum = geom.effective_height_m[0] + geom.effective_height_m[1];
    let sin_psi = height_sum / (distance_m * distance_m + height_sum * height_sum).sqrt();

    // Effective reflection coefficient, attenuated by surface roughness.
    let mut reflection = (Complex64::new(sin_psi, 0.0) - geom.ground_impedance)
        / (Complex64::new(sin_psi, 0.0) + geom.ground_impedance)
        * (-(wave_number * sigma * sin_psi).min(10.0)).exp();

    // A reflection weaker than both 0.25 and sin psi is unphysically small
    // for grazing geometry; rescale its magnitude up to sin psi.
    let mag_sq = reflection.norm_sqr();
    if mag_sq < 0.25 || mag_sq < sin_psi {
        reflection *= (sin_psi / mag_sq).sqrt();
    }

    // Phase difference between direct and reflected rays, folded so it
    // saturates instead of wrapping.
    let mut phase = wave_number * 2.0 * geom.effective_height_m[0] * geom.effective_height_m[1]
        / distance_m;
    if phase > std::f64::consts::FRAC_PI_2 {
        phase = std::f64::consts::PI
            - std::f64::consts::FRAC_PI_2 * std::f64::consts::FRAC_PI_2 / phase;
    }

    let two_ray = Complex64::new(phase.cos(), -phase.sin()) + reflection;
    let a_two_ray = -10.0 * two_ray.norm_sqr().log10();

    let a_diffraction = diffraction_slope * distance_m + diffraction_intercept;

    let weight = 1.0 / (1.0 + geom.frequency_mhz * geom.delta_h_m / d_sml_m.max(10.0e3));

    weight * a_two_ray + (1.0 - weight) * a_diffraction
}
