//! The two prediction drivers: point-to-point and area mode.
//!
//! Both run the same pipeline (validate, derive geometry, compute the
//! Longley-Rice reference attenuation, add free-space loss and the
//! variability adjustment) and differ only in where the geometry comes
//! from.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ItmError, ItmResult, Warnings};
use crate::geometry::{free_space_loss_db, PathGeometry};
use crate::longley_rice::reference_attenuation;
use crate::params::{ItmParams, PropagationMode, SitingCriteria};
use crate::terrain::TerrainProfile;
use crate::variability::variability_adjustment;

/// Output of a prediction: the attenuation and the intermediate quantities
/// useful for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Basic transmission loss, in dB, adjusted for variability. Never
    /// negative.
    pub attenuation_db: f64,
    /// Reference (median) attenuation relative to free space, in dB.
    pub reference_attenuation_db: f64,
    /// Free-space basic transmission loss, in dB.
    pub free_space_loss_db: f64,
    /// Terrain irregularity parameter Δh, in meters.
    pub delta_h_m: f64,
    /// Horizon distances, in meters (tx, rx).
    pub horizon_distance_m: [f64; 2],
    /// Effective terminal heights, in meters (tx, rx).
    pub effective_height_m: [f64; 2],
    /// Signed horizon elevation angles, in radians (tx, rx).
    pub horizon_angle_rad: [f64; 2],
    /// Surface refractivity, in N-units.
    pub surface_refractivity_n: f64,
    /// Path distance, in meters.
    pub path_distance_m: f64,
    /// Dominant propagation mechanism.
    pub mode: PropagationMode,
    /// Soft-range warnings accumulated along the way.
    pub warnings: Warnings,
}

/// Point-to-point prediction over a sampled terrain profile.
pub fn point_to_point(params: &ItmParams, terrain: &TerrainProfile) -> ItmResult<PredictionResult> {
    let warnings = params.validate()?;
    let geometry = PathGeometry::from_profile(params, terrain);
    finish(params, geometry, warnings, true)
}

/// Area-mode prediction from siting criteria and a terrain-irregularity
/// parameter, without an explicit profile.
pub fn area(
    params: &ItmParams,
    tx_siting: SitingCriteria,
    rx_siting: SitingCriteria,
    distance_km: f64,
    delta_h_m: f64,
) -> ItmResult<PredictionResult> {
    let warnings = params.validate()?;
    if distance_km <= 0.0 {
        return Err(ItmError::PathDistanceNonPositive(distance_km * 1.0e3));
    }
    if delta_h_m < 0.0 {
        return Err(ItmError::NegativeDeltaH(delta_h_m));
    }
    let geometry =
        PathGeometry::from_area(params, tx_siting, rx_siting, distance_km * 1.0e3, delta_h_m);
    finish(params, geometry, warnings, false)
}

fn finish(
    params: &ItmParams,
    geometry: PathGeometry,
    mut warnings: Warnings,
    is_p2p: bool,
) -> ItmResult<PredictionResult> {
    warnings |= geometry.range_warnings();

    let (a_ref, mode) = reference_attenuation(&geometry, is_p2p);
    let a_fs = free_space_loss_db(geometry.path_distance_m, geometry.frequency_mhz);

    let adjustment = variability_adjustment(
        &geometry,
        params.time_percent / 100.0,
        params.location_percent / 100.0,
        params.situation_percent / 100.0,
        a_ref,
        params.climate,
        params.variability,
    );

    let attenuation = (a_fs + adjustment).max(0.0);

    debug!(
        distance_m = geometry.path_distance_m,
        delta_h_m = geometry.delta_h_m,
        a_ref_db = a_ref,
        a_fs_db = a_fs,
        mode = %mode,
        "prediction complete"
    );
    if !warnings.is_empty() {
        warn!(warnings = warnings.bits(), "parameters outside design range");
    }

    Ok(PredictionResult {
        attenuation_db: attenuation,
        reference_attenuation_db: a_ref,
        free_space_loss_db: a_fs,
        delta_h_m: geometry.delta_h_m,
        horizon_distance_m: geometry.horizon_distance_m,
        effective_height_m: geometry.effective_height_m,
        horizon_angle_rad: geometry.horizon_angle_rad,
        surface_refractivity_n: geometry.surface_refractivity_n,
        path_distance_m: geometry.path_distance_m,
        mode,
        warnings,
    })
}
