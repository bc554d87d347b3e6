//! Diffraction loss: knife-edge and Vogler three-radii smooth earth,
//! blended by a terrain-dependent weight, plus the clutter factor.
//!
//! The smooth-earth part follows Vogler's 1964 three-radii formulation: one
//! fictitious earth radius for the path between the horizons and one per
//! terminal, each with its own normalized distance and ground parameter. The
//! knife-edge part is the classic two-edge Fresnel construction from
//! NBS TN-101.

use crate::geometry::PathGeometry;
use crate::terrain::{sigma_h, terrain_roughness};
use crate::{EARTH_CURVATURE_PER_M, WAVE_TO_MHZ_TERM};

const THIRD: f64 = 1.0 / 3.0;

/// Approximation of the Fresnel integral G(ν), in dB.
pub fn fresnel_integral(nu: f64) -> f64 {
    if nu < 2.4 {
        6.02 + 9.11 * nu - 1.27 * nu * nu
    } else {
        12.953 + 20.0 * nu.log10()
    }
}

/// Height-gain function F(x, K) for smooth-earth diffraction, in dB.
///
/// Piecewise: a small-distance asymptote, the exponential-attenuation
/// regime, and the linear-log form beyond x = 2000, smoothly blended
/// across the 200..2000 span.
pub fn height_gain(x: f64, k: f64) -> f64 {
    if x < 200.0 {
        let w = -k.ln();
        if k < 1.0e-5 || x * w * w * w > 5495.0 {
            if x > 1.0 {
                17.372 * x.ln() - 117.0
            } else {
                -117.0
            }
        } else {
            2.5e-5 * x * x / k - 8.686 * w - 15.0
        }
    } else {
        let base = 0.05751 * x - 4.343 * x.ln();
        if x < 2000.0 {
            let w = 0.0134 * x * (-0.005 * x).exp();
            (1.0 - w) * base + w * (17.372 * x.ln() - 117.0)
        } else {
            base
        }
    }
}

/// Knife-edge diffraction loss at `distance_m`, in dB.
pub fn knife_edge_loss_db(geom: &PathGeometry, distance_m: f64, theta_los_rad: f64) -> f64 {
    let a_e = geom.effective_earth_radius_m();
    let d_ml = geom.horizon_distance_m[0] + geom.horizon_distance_m[1];
    let theta_nlos = distance_m / a_e - theta_los_rad;
    let d_nlos = distance_m - d_ml;

    // 1/(4 pi) = 0.0795775, TN-101 Eq I.7.
    let common = 0.0795775 * (geom.frequency_mhz / WAVE_TO_MHZ_TERM) * theta_nlos * theta_nlos
        * d_nlos;
    let nu_tx = common * geom.horizon_distance_m[0] / (d_nlos + geom.horizon_distance_m[0]);
    let nu_rx = common * geom.horizon_distance_m[1] / (d_nlos + geom.horizon_distance_m[1]);

    fresnel_integral(nu_tx) + fresnel_integral(nu_rx)
}

/// Smooth-earth diffraction loss at `distance_m` via the Vogler three-radii
/// method, in dB.
pub fn smooth_earth_loss_db(geom: &PathGeometry, distance_m: f64, theta_los_rad: f64) -> f64 {
    let a_e = geom.effective_earth_radius_m();
    let d_ml = geom.horizon_distance_m[0] + geom.horizon_distance_m[1];
    let theta_nlos = distance_m / a_e - theta_los_rad;

    // Three fictitious radii: the diffraction path between the horizons,
    // then one per terminal from Vogler 1964 Eq 3 rearranged.
    let radii = [
        (distance_m - d_ml) / theta_nlos,
        0.5 * geom.horizon_distance_m[0] * geom.horizon_distance_m[0]
            / geom.effective_height_m[0],
        0.5 * geom.horizon_distance_m[1] * geom.horizon_distance_m[1]
            / geom.effective_height_m[1],
    ];

    let mut c = [0.0; 3];
    let mut k = [0.0; 3];
    let mut b = [0.0; 3];
    let impedance_mag = geom.ground_impedance.norm();
    for i in 0..3 {
        // C = (4/3k)^(1/3), the 4/3-earth to effective-earth ratio,
        // Vogler 1964 Eq 2.
        c[i] = ((4.0 / 3.0) * (1.0 / EARTH_CURVATURE_PER_M) / radii[i]).powf(THIRD);
        // Vogler 1964 Eq 6a/7a.
        k[i] = 0.017778 * c[i] * geom.frequency_mhz.powf(-THIRD) / impedance_mag;
        // Vogler 1964 Fig 4.
        b[i] = 1.607 - k[i];
    }

    let arc_km = [
        radii[0] * theta_nlos * 1.0e-3,
        geom.horizon_distance_m[0] * 1.0e-3,
        geom.horizon_distance_m[1] * 1.0e-3,
    ];

    // Normalized distances, Vogler 1964 Eq 2.
    let f_cbrt = geom.frequency_mhz.powf(THIRD);
    let x_tx = b[1] * c[1] * c[1] * f_cbrt * arc_km[1];
    let x_rx = b[2] * c[2] * c[2] * f_cbrt * arc_km[2];
    let x_total = b[0] * c[0] * c[0] * f_cbrt * arc_km[0] + x_tx + x_rx;

    // Distance gain, TN-101 Eq 8.4.
    let g_d = 0.05751 * x_total - 10.0 * x_total.log10();

    g_d - height_gain(x_tx, k[1]) - height_gain(x_rx, k[2]) - 20.0
}

/// Total diffraction loss at `distance_m`: weighted blend of the smooth-earth
/// and knife-edge losses plus the clutter factor, in dB.
pub fn diffraction_loss_db(
    geom: &PathGeometry,
    distance_m: f64,
    theta_los_rad: f64,
    d_sml_m: f64,
    is_p2p: bool,
) -> f64 {
    let a_e = geom.effective_earth_radius_m();
    let a_k = knife_edge_loss_db(geom, distance_m, theta_los_rad);
    let a_r = smooth_earth_loss_db(geom, distance_m, theta_los_rad);

    // Clutter factor from the roughness at the smooth-earth horizon,
    // ERL 79-ITS 67 Eq 3.38c.
    let sigma = sigma_h(terrain_roughness(d_sml_m, geom.delta_h_m));
    let clutter = (5.0
        * (1.0
            + 1.0e-5
                * geom.structural_height_m[0]
                * geom.structural_height_m[1]
                * geom.frequency_mhz
                * sigma)
            .log10())
    .min(15.0);

    // Blend weight, ERL 79-ITS 67 Eq 3.23. Known path parameters are worth
    // about 10 m^2 of terminal height product.
    let rough = terrain_roughness(distance_m, geom.delta_h_m);
    let mut q = geom.structural_height_m[0] * geom.structural_height_m[1];
    let q_k = geom.effective_height_m[0] * geom.effective_height_m[1] - q;
    if is_p2p {
        q += 10.0;
    }
    let d_ml = geom.horizon_distance_m[0] + geom.horizon_distance_m[1];
    let term = (1.0 + q_k / q).sqrt();
    q = (term + (-theta_los_rad * a_e + d_ml) / distance_m)
        * (rough * geom.frequency_mhz / WAVE_TO_MHZ_TERM).min(6283.2);
    let weight = 25.1 / (25.1 + q.sqrt());

    weight * a_r + (1.0 - weight) * a_k + clutter
}
