//! Statistical variability: adjust the reference attenuation for the
//! requested time, location, and situation quantiles.
//!
//! The long-term fading statistics come from the NBS TN-101 chapter 10
//! climate curves. Each climate contributes a median curve V(d_e) and two
//! time-fading curves (below/above the median), all functions of an
//! *effective distance* d_e; frequency factors stretch the time curves, and
//! the location and situation terms are closed-form in Δh, wavenumber, and
//! d_e. The variability mode decides which deviates act as random variables
//! and which as confidences.

use crate::geometry::PathGeometry;
use crate::math::inv_complementary_cdf;
use crate::params::{RadioClimate, VariabilityMode};
use crate::WAVE_TO_MHZ_TERM;

/// One TN-101 climate curve: `(c₁ + c₂/(1 + ((d_e−x₂)/x₃)²)) · (d_e/x₁)² /
/// (1 + (d_e/x₁)²)`.
#[derive(Debug, Clone, Copy)]
struct Curve {
    c1: f64,
    c2: f64,
    x1: f64,
    x2: f64,
    x3: f64,
}

impl Curve {
    const fn new(c1: f64, c2: f64, x1: f64, x2: f64, x3: f64) -> Self {
        Self { c1, c2, x1, x2, x3 }
    }

    fn eval(&self, de: f64) -> f64 {
        let ratio_sq = (de / self.x1) * (de / self.x1);
        (self.c1 + self.c2 / (1.0 + ((de - self.x2) / self.x3).powi(2))) * ratio_sq
            / (1.0 + ratio_sq)
    }
}

/// Frequency stretch factor `b₁ + b₂/((b₃·ln(0.133·k))² + 1)`.
#[derive(Debug, Clone, Copy)]
struct FreqFactor(f64, f64, f64);

impl FreqFactor {
    fn eval(&self, wave_number: f64) -> f64 {
        let q = (0.133 * wave_number).ln();
        self.0 + self.1 / ((self.2 * q).powi(2) + 1.0)
    }
}

/// The full constant row for one radio climate.
#[derive(Debug, Clone, Copy)]
struct ClimateConstants {
    /// Median attenuation curve V(d_e).
    v: Curve,
    /// Time fading below the median.
    sigma_t_minus: Curve,
    /// Time fading above the median.
    sigma_t_plus: Curve,
    /// Ratio of the far-tail to the upper time deviation.
    c_d: f64,
    /// Deviate at which the far tail takes over.
    z_d: f64,
    freq_minus: FreqFactor,
    freq_plus: FreqFactor,
}

impl From<RadioClimate> for ClimateConstants {
    fn from(climate: RadioClimate) -> Self {
        match climate {
            RadioClimate::Equatorial => ClimateConstants {
                v: Curve::new(-9.67, 12.7, 144.9e3, 190.3e3, 133.8e3),
                sigma_t_minus: Curve::new(2.13, 159.5, 762.2e3, 123.6e3, 94.5e3),
                sigma_t_plus: Curve::new(2.11, 102.3, 636.9e3, 134.8e3, 95.6e3),
                c_d: 1.224,
                z_d: 1.282,
                freq_minus: FreqFactor(1.0, 0.0, 0.0),
                freq_plus: FreqFactor(1.0, 0.0, 0.0),
            },
            RadioClimate::ContinentalSubtropical => ClimateConstants {
                v: Curve::new(-0.62, 9.19, 228.9e3, 205.2e3, 143.6e3),
                sigma_t_minus: Curve::new(2.66, 7.67, 100.4e3, 172.5e3, 136.4e3),
                sigma_t_plus: Curve::new(6.87, 15.53, 138.7e3, 143.7e3, 98.6e3),
                c_d: 0.801,
                z_d: 2.161,
                freq_minus: FreqFactor(1.0, 0.0, 0.0),
                freq_plus: FreqFactor(0.93, 0.31, 2.00),
            },
            RadioClimate::MaritimeSubtropical => ClimateConstants {
                v: Curve::new(1.26, 15.5, 262.6e3, 185.2e3, 99.8e3),
                sigma_t_minus: Curve::new(6.11, 6.65, 138.2e3, 242.2e3, 178.6e3),
                sigma_t_plus: Curve::new(10.08, 9.60, 165.3e3, 225.7e3, 129.7e3),
                c_d: 1.380,
                z_d: 1.282,
                freq_minus: FreqFactor(1.0, 0.0, 0.0),
                freq_plus: FreqFactor(1.0, 0.0, 0.0),
            },
            RadioClimate::Desert => ClimateConstants {
                v: Curve::new(-9.21, 9.05, 84.1e3, 101.1e3, 98.6e3),
                sigma_t_minus: Curve::new(1.98, 13.11, 139.1e3, 132.7e3, 193.5e3),
                sigma_t_plus: Curve::new(3.68, 159.3, 464.4e3, 93.1e3, 94.2e3),
                c_d: 1.000,
                z_d: 20.0,
                freq_minus: FreqFactor(1.0, 0.0, 0.0),
                freq_plus: FreqFactor(0.93, 0.19, 1.79),
            },
            RadioClimate::ContinentalTemperate => ClimateConstants {
                v: Curve::new(-0.62, 9.19, 228.9e3, 205.2e3, 143.6e3),
                sigma_t_minus: Curve::new(2.68, 7.16, 93.7e3, 186.8e3, 133.5e3),
                sigma_t_plus: Curve::new(4.75, 8.12, 93.2e3, 135.9e3, 113.4e3),
                c_d: 1.224,
                z_d: 1.282,
                freq_minus: FreqFactor(0.92, 0.25, 1.77),
                freq_plus: FreqFactor(0.93, 0.31, 2.00),
            },
            RadioClimate::MaritimeTemperateOverLand => ClimateConstants {
                v: Curve::new(-0.39, 2.86, 141.7e3, 315.9e3, 167.4e3),
                sigma_t_minus: Curve::new(6.86, 10.38, 187.8e3, 169.6e3, 108.9e3),
                sigma_t_plus: Curve::new(8.58, 13.97, 216.0e3, 152.0e3, 122.7e3),
                c_d: 1.518,
                z_d: 1.282,
                freq_minus: FreqFactor(1.0, 0.0, 0.0),
                freq_plus: FreqFactor(1.0, 0.0, 0.0),
            },
            RadioClimate::MaritimeTemperateOverSea => ClimateConstants {
                v: Curve::new(3.15, 857.9, 2222.0e3, 164.8e3, 116.3e3),
                sigma_t_minus: Curve::new(8.51, 169.8, 609.8e3, 119.9e3, 106.6e3),
                sigma_t_plus: Curve::new(8.43, 8.19, 136.2e3, 188.5e3, 122.9e3),
                c_d: 1.518,
                z_d: 1.282,
                freq_minus: FreqFactor(1.0, 0.0, 0.0),
                freq_plus: FreqFactor(1.0, 0.0, 0.0),
            },
        }
    }
}

/// Quantile-adjusted attenuation relative to free space, in dB.
///
/// `time`, `location`, and `situation` are fractions in (0, 1). The return
/// value is added to the free-space loss by the driver; a negative excursion
/// is softened through `y·(29 − y)/(29 − 10·y)` so the total can never fall
/// unboundedly below free space.
pub fn variability_adjustment(
    geom: &PathGeometry,
    time: f64,
    location: f64,
    situation: f64,
    a_ref_db: f64,
    climate: RadioClimate,
    mode: VariabilityMode,
) -> f64 {
    let constants = ClimateConstants::from(climate);
    let wave_number = geom.frequency_mhz / WAVE_TO_MHZ_TERM;
    let d = geom.path_distance_m;

    let mut z_time = inv_complementary_cdf(time);
    let mut z_location = inv_complementary_cdf(location);
    let z_confidence = inv_complementary_cdf(situation);

    // Effective distance: scaled by the smooth-earth horizon of a 9000 km
    // earth plus a frequency term.
    let d_ex = (18.0e6 * geom.effective_height_m[0]).sqrt()
        + (18.0e6 * geom.effective_height_m[1]).sqrt()
        + (575.7e12 / wave_number).powf(1.0 / 3.0);
    let d_e = if d < d_ex {
        130.0e3 * d / d_ex
    } else {
        130.0e3 + d - d_ex
    };

    let v_median = constants.v.eval(d_e);
    let sigma_t_minus = constants.sigma_t_minus.eval(d_e) * constants.freq_minus.eval(wave_number);
    let sigma_t_plus = constants.sigma_t_plus.eval(d_e) * constants.freq_plus.eval(wave_number);
    let sigma_t_tail = sigma_t_plus * constants.c_d;
    let tail_slope = (sigma_t_plus - sigma_t_tail) * constants.z_d;

    // Location variability from the terrain seen by the path.
    let q = (1.0 - 0.8 * (-d / 50.0e3).exp()) * geom.delta_h_m * wave_number;
    let sigma_l = 10.0 * q / (q + 13.0);

    // Situation variability floor.
    let sigma_s_sq = (5.0 + 3.0 * (-d_e / 100.0e3).exp()).powi(2);

    // Which deviates act as random variables depends on the mode.
    match mode {
        VariabilityMode::SingleMessage => {
            z_time = z_confidence;
            z_location = z_confidence;
        }
        VariabilityMode::Accidental => z_location = z_confidence,
        VariabilityMode::Mobile => z_location = z_time,
        VariabilityMode::Broadcast => {}
    }

    // Time deviation is asymmetric about the median, with a separate far
    // tail above z_d.
    let sigma_t = if z_time < 0.0 {
        sigma_t_minus
    } else if z_time <= constants.z_d {
        sigma_t_plus
    } else {
        sigma_t_tail + tail_slope / z_time
    };

    let vs = sigma_s_sq
        + (sigma_t * z_time).powi(2) / (7.8 + z_confidence * z_confidence)
        + (sigma_l * z_location).powi(2) / (24.0 + z_confidence * z_confidence);

    let (y_random, sigma_c) = match mode {
        VariabilityMode::SingleMessage => {
            (0.0, (sigma_t * sigma_t + sigma_l * sigma_l + vs).sqrt())
        }
        VariabilityMode::Accidental => (sigma_t * z_time, (sigma_l * sigma_l + vs).sqrt()),
        VariabilityMode::Mobile => (
            (sigma_t * sigma_t + sigma_l * sigma_l).sqrt() * z_time,
            vs.sqrt(),
        ),
        VariabilityMode::Broadcast => (sigma_t * z_time + sigma_l * z_location, vs.sqrt()),
    };

    let adjusted = a_ref_db - v_median - y_random - sigma_c * z_confidence;
    if adjusted < 0.0 {
        // Confidence-limit floor on excursions below free space.
        adjusted * (29.0 - adjusted) / (29.0 - 10.0 * adjusted)
    } else {
        adjusted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ItmParams;
    use crate::terrain::TerrainProfile;

    fn rolling_geom() -> PathGeometry {
        // 50 m one-cycle sinusoid over 100 km at 500 MHz: nonzero delta_h so
        // the location term participates.
        let params = ItmParams::builder().heights(30.0, 30.0).frequency(500.0).build();
        let heights: Vec<f64> = (0..101)
            .map(|i| 50.0 * (2.0 * std::f64::consts::PI * i as f64 / 100.0).sin())
            .collect();
        let profile = TerrainProfile::new(heights, 1000.0).unwrap();
        PathGeometry::from_profile(&params, &profile)
    }

    #[test]
    fn test_mode_mixing() {
        let geom = rolling_geom();
        let at = |mode| {
            variability_adjustment(
                &geom,
                0.1,
                0.3,
                0.9,
                100.0,
                RadioClimate::ContinentalTemperate,
                mode,
            )
        };
        assert!((at(VariabilityMode::SingleMessage) - 115.771_589).abs() < 1e-4);
        assert!((at(VariabilityMode::Accidental) - 101.291_692).abs() < 1e-4);
        assert!((at(VariabilityMode::Mobile) - 90.007_273).abs() < 1e-4);
        assert!((at(VariabilityMode::Broadcast) - 89.558_534).abs() < 1e-4);
    }

    #[test]
    fn test_median_prediction_subtracts_v_curve() {
        let geom = rolling_geom();
        let adjusted = variability_adjustment(
            &geom,
            0.5,
            0.5,
            0.5,
            100.0,
            RadioClimate::ContinentalTemperate,
            VariabilityMode::Broadcast,
        );
        // All deviates are zero at the median; only V(d_e) remains.
        assert!((adjusted - 98.249_492).abs() < 1e-4);
    }

    #[test]
    fn test_single_message_ignores_time_and_location() {
        let geom = rolling_geom();
        let reference = variability_adjustment(
            &geom,
            0.01,
            0.5,
            0.7,
            100.0,
            RadioClimate::ContinentalTemperate,
            VariabilityMode::SingleMessage,
        );
        for (t, l) in [(0.99, 0.5), (0.01, 0.9), (0.5, 0.1)] {
            let other = variability_adjustment(
                &geom,
                t,
                l,
                0.7,
                100.0,
                RadioClimate::ContinentalTemperate,
                VariabilityMode::SingleMessage,
            );
            assert_eq!(reference, other);
        }
    }

    #[test]
    fn test_better_time_percentage_costs_margin() {
        // Serving 99% of the time demands more margin than 1% of the time.
        let geom = rolling_geom();
        let easy = variability_adjustment(
            &geom,
            0.01,
            0.5,
            0.5,
            100.0,
            RadioClimate::ContinentalTemperate,
            VariabilityMode::Broadcast,
        );
        let hard = variability_adjustment(
            &geom,
            0.99,
            0.5,
            0.5,
            100.0,
            RadioClimate::ContinentalTemperate,
            VariabilityMode::Broadcast,
        );
        assert!(easy < hard);
    }

    #[test]
    fn test_negative_excursion_softened() {
        let params = ItmParams::default();
        let profile = TerrainProfile::new(vec![0.0; 11], 1000.0).unwrap();
        let geom = PathGeometry::from_profile(&params, &profile);
        let adjusted = variability_adjustment(
            &geom,
            0.5,
            0.5,
            0.5,
            -5.0,
            RadioClimate::ContinentalTemperate,
            VariabilityMode::Broadcast,
        );
        assert!((adjusted + 2.1542).abs() < 1e-4);
        // Softer than the raw excursion of -5.01 dB.
        assert!(adjusted > -5.0);
    }

    #[test]
    fn test_climates_differ() {
        let geom = rolling_geom();
        let mut values: Vec<f64> = [
            RadioClimate::Equatorial,
            RadioClimate::Desert,
            RadioClimate::MaritimeTemperateOverSea,
        ]
        .into_iter()
        .map(|climate| {
            variability_adjustment(
                &geom,
                0.1,
                0.5,
                0.5,
                100.0,
                climate,
                VariabilityMode::Broadcast,
            )
        })
        .collect();
        values.dedup();
        assert_eq!(values.len(), 3, "climate rows must differ");
    }
}
