//! # ITM Core: Irregular Terrain Model propagation engine
//!
//! This crate implements the ITS Irregular Terrain Model (ITM, also known as
//! Longley-Rice), a deterministic radio-wave propagation loss predictor for
//! frequencies from 20 MHz to 20 GHz over irregular terrain.
//!
//! ## Overview
//!
//! Given transmitter/receiver geometry, electrical ground parameters, a radio
//! climate, and either a sampled terrain elevation profile (point-to-point
//! mode) or a statistical terrain-irregularity parameter (area mode), the
//! model predicts basic transmission loss in decibels together with the
//! intermediate quantities useful for diagnostics.
//!
//! ## Pipeline
//!
//! ```text
//! terrain profile ─► horizons ─► effective heights, Δh ─┐
//!                                                       ├─► Longley-Rice
//! siting criteria ─► synthesized horizons & heights ────┘   reference
//!                                                           attenuation
//!                        ┌──────────────┬────────────────┐
//!                        ▼              ▼                ▼
//!                   two-ray LoS    diffraction      troposcatter
//!                        └──────────────┴────────────────┘
//!                                       │
//!                        free-space loss + variability
//!                                       │
//!                                       ▼
//!                              attenuation (dB)
//! ```
//!
//! The three regime models are blended with slope/intercept extrapolations;
//! the statistical variability step adjusts the median prediction for the
//! requested time/location/situation percentages.
//!
//! ## Example
//!
//! ```rust
//! use itm_core::prelude::*;
//!
//! // 10 km flat path, 10 m masts, 100 MHz, average ground.
//! let params = ItmParams::builder()
//!     .heights(10.0, 10.0)
//!     .frequency(100.0)
//!     .build();
//! let terrain = TerrainProfile::new(vec![0.0; 11], 1_000.0).unwrap();
//!
//! let result = itm_core::point_to_point(&params, &terrain).unwrap();
//! assert!(result.attenuation_db > result.free_space_loss_db);
//! ```
//!
//! Calls are purely computational and deterministic: no I/O, no shared
//! state, no randomness. Independent calls may run on different threads
//! without coordination.

pub mod diffraction;
pub mod error;
pub mod geometry;
pub mod line_of_sight;
pub mod longley_rice;
pub mod math;
pub mod params;
pub mod prediction;
pub mod terrain;
pub mod troposcatter;
pub mod variability;

pub use error::{ItmError, ItmResult, Warnings};
pub use params::{
    ItmParams, Polarization, PropagationMode, RadioClimate, SitingCriteria, VariabilityMode,
};
pub use prediction::{area, point_to_point, PredictionResult};
pub use terrain::TerrainProfile;

/// Convenience re-exports for the common use case.
pub mod prelude {
    pub use crate::error::{ItmError, ItmResult, Warnings};
    pub use crate::params::{
        ItmParams, Polarization, PropagationMode, RadioClimate, SitingCriteria, VariabilityMode,
    };
    pub use crate::prediction::{area, point_to_point, PredictionResult};
    pub use crate::terrain::TerrainProfile;
}

/// Per-MHz angular wavenumber term: c · 10⁻⁶ / 2π, in m·MHz.
///
/// Dividing a frequency in MHz by this constant yields the angular wavenumber
/// in radians per meter.
pub(crate) const WAVE_TO_MHZ_TERM: f64 = 299_792_458.0 * 1.0e-6 / (2.0 * std::f64::consts::PI);

/// Curvature of the actual earth, using the WGS-84 mean radius of
/// 6 371 008.7714 m.
pub(crate) const EARTH_CURVATURE_PER_M: f64 = 1.0 / 6_371_008.7714;

/// Loss value used to signal that a regime produced no usable prediction.
pub(crate) const MAX_LOSS_DB: f64 = 999.0;
