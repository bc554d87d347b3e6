//! Terrain profile container and terrain statistics.
//!
//! A [`TerrainProfile`] is an ordered sequence of elevations above mean sea
//! level at uniform spacing along the great-circle path, transmitter side
//! first. The statistics extracted here feed the horizon geometry and the
//! loss models: the interior mean elevation (which scales refractivity), the
//! terrain irregularity parameter Δh, and its two derived roughness figures.

use serde::{Deserialize, Serialize};

use crate::error::{ItmError, ItmResult};
use crate::math::{kth_largest, linear_least_squares};

/// Sampled terrain elevations between the terminals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainProfile {
    heights_m: Vec<f64>,
    resolution_m: f64,
}

impl TerrainProfile {
    /// Build a profile from `N + 1` elevation samples spaced `resolution_m`
    /// meters apart. Requires at least two samples and a positive spacing.
    pub fn new(heights_m: Vec<f64>, resolution_m: f64) -> ItmResult<Self> {
        let distance = (heights_m.len().saturating_sub(1)) as f64 * resolution_m;
        if heights_m.len() < 2 || resolution_m <= 0.0 {
            return Err(ItmError::PathDistanceNonPositive(distance));
        }
        Ok(Self {
            heights_m,
            resolution_m,
        })
    }

    /// The elevation samples.
    pub fn heights_m(&self) -> &[f64] {
        &self.heights_m
    }

    /// Spacing between successive samples, in meters.
    pub fn resolution_m(&self) -> f64 {
        self.resolution_m
    }

    /// Number of intervals along the path.
    pub fn intervals(&self) -> usize {
        self.heights_m.len() - 1
    }

    /// Total path distance, in meters.
    pub fn distance_m(&self) -> f64 {
        self.intervals() as f64 * self.resolution_m
    }

    /// Mean elevation of the path interior, skipping the first and last 10%
    /// of the samples. Used to scale refractivity down to the surface value.
    pub fn interior_mean_elevation_m(&self) -> f64 {
        let n = self.intervals();
        let tenth = (0.1 * n as f64) as usize;
        let window = &self.heights_m[tenth..=n - tenth];
        window.iter().sum::<f64>() / window.len() as f64
    }
}

/// Terrain irregularity Δh at a given distance: the asymptotic interdecile
/// value deflated for short paths.
pub fn terrain_roughness(distance_m: f64, delta_h_m: f64) -> f64 {
    delta_h_m * (1.0 - 0.8 * (-distance_m / 50.0e3).exp())
}

/// RMS deviation σ_h of terrain and clutter within the first Fresnel zone of
/// the dominant reflecting plane.
pub fn sigma_h(delta_h_m: f64) -> f64 {
    0.78 * delta_h_m * (-0.5 * delta_h_m.powf(0.25)).exp()
}

/// Terrain irregularity parameter Δh over the window
/// `[d_start_m, d_end_m]`.
///
/// The window interior is resampled onto `10k − 5` uniform points
/// (`k` between 4 and 25 depending on window length), a linear trend is
/// removed, and Δh is the interdecile range (the k-th largest minus the
/// k-th smallest residual), corrected back to the asymptotic value for the
/// window length.
pub fn delta_h(profile: &TerrainProfile, d_start_m: f64, d_end_m: f64) -> f64 {
    let heights = profile.heights_m();
    let mut xa = d_start_m / profile.resolution_m();
    let xb = d_end_m / profile.resolution_m();
    if xb - xa < 2.0 {
        return 0.0;
    }

    let ka = ((0.1 * (xb - xa + 8.0)) as usize).clamp(4, 25);
    let n = 10 * ka - 5;
    let kb = n - ka + 1;
    let sn = (n - 1) as f64;

    // Resample the window interior by linear interpolation.
    let step = (xb - xa) / sn;
    let mut k = (xa + 1.0) as usize;
    xa -= k as f64;
    let mut resampled = Vec::with_capacity(n);
    for _ in 0..n {
        while xa > 0.0 && k + 1 < heights.len() {
            xa -= 1.0;
            k += 1;
        }
        resampled.push(heights[k] + (heights[k] - heights[k - 1]) * xa);
        xa += step;
    }

    // Remove the linear trend.
    let (y_first, y_last) = linear_least_squares(&resampled, 1.0, 0.0, sn);
    let slope = (y_last - y_first) / sn;
    let mut trend = y_first;
    for value in resampled.iter_mut() {
        *value -= trend;
        trend += slope;
    }

    let q10 = kth_largest(&resampled, ka);
    let q90 = kth_largest(&resampled, kb);

    (q10 - q90) / (1.0 - 0.8 * (-(d_end_m - d_start_m) / 50.0e3).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sinusoid(amplitude: f64, samples: usize, period_samples: f64) -> Vec<f64> {
        (0..samples)
            .map(|i| amplitude * (2.0 * std::f64::consts::PI * i as f64 / period_samples).sin())
            .collect()
    }

    #[test]
    fn test_profile_rejects_degenerate_input() {
        assert!(TerrainProfile::new(vec![0.0], 1000.0).is_err());
        assert!(TerrainProfile::new(vec![0.0, 0.0], 0.0).is_err());
        assert!(TerrainProfile::new(vec![0.0, 0.0], -5.0).is_err());
    }

    #[test]
    fn test_distance_and_intervals() {
        let p = TerrainProfile::new(vec![0.0; 11], 1000.0).unwrap();
        assert_eq!(p.intervals(), 10);
        assert_eq!(p.distance_m(), 10_000.0);
    }

    #[test]
    fn test_interior_mean_skips_ends() {
        // Spikes at the terminals must not bias the interior mean.
        let mut heights = vec![100.0; 11];
        heights[0] = 10_000.0;
        heights[10] = 10_000.0;
        let p = TerrainProfile::new(heights, 1000.0).unwrap();
        assert_eq!(p.interior_mean_elevation_m(), 100.0);
    }

    #[test]
    fn test_delta_h_flat_is_zero() {
        let p = TerrainProfile::new(vec![0.0; 101], 1000.0).unwrap();
        assert_eq!(delta_h(&p, 450.0, 99_550.0), 0.0);
    }

    #[test]
    fn test_delta_h_short_window_is_zero() {
        let p = TerrainProfile::new(vec![0.0, 5.0, 0.0], 1000.0).unwrap();
        assert_eq!(delta_h(&p, 900.0, 1100.0), 0.0);
    }

    #[test]
    fn test_delta_h_rolling_terrain() {
        // 50 m sinusoid, 10 km period, sampled at 1 km over 100 km.
        let p = TerrainProfile::new(sinusoid(50.0, 101, 10.0), 1000.0).unwrap();
        let dh = delta_h(&p, 450.0, 99_550.0);
        assert!((dh - 101.482_600_77).abs() < 1e-6, "dh = {dh}");

        // One slow cycle over the full path detrends to a smaller spread.
        let p = TerrainProfile::new(sinusoid(50.0, 101, 100.0), 1000.0).unwrap();
        let dh = delta_h(&p, 450.0, 99_550.0);
        assert!((dh - 61.787_932_68).abs() < 1e-6, "dh = {dh}");
    }

    #[test]
    fn test_roughness_saturates_with_distance() {
        let dh = 90.0;
        let near = terrain_roughness(1.0e3, dh);
        let mid = terrain_roughness(50.0e3, dh);
        let far = terrain_roughness(1.0e7, dh);
        assert!(near < mid && mid < far);
        assert!((mid - 63.512_680_24).abs() < 1e-6);
        assert!((far - dh).abs() < 1e-6);
    }

    #[test]
    fn test_sigma_h_value() {
        assert!((sigma_h(50.0) - 10.319_008_42).abs() < 1e-6);
        assert_eq!(sigma_h(0.0), 0.0);
    }
}
