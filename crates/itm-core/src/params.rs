//! Input parameters and the closed enumerations of the model.
//!
//! All quantities carry explicit physical units in their field names:
//! meters, MHz, S/m, N-units, percentages in (0, 100). The parameter set is
//! immutable for the duration of a prediction.
//!
//! ## Supported ranges
//!
//! | Parameter       | Hard range        | Design range    |
//! |-----------------|-------------------|-----------------|
//! | terminal height | 0.5 m – 3000 m    | 1 m – 1000 m    |
//! | frequency       | 20 MHz – 20 GHz   | 40 MHz – 10 GHz |
//! | refractivity    | 250 – 400 N-units | —               |
//! | permittivity    | >= 1              | —               |
//! | conductivity    | > 0 S/m           | —               |
//! | percentages     | (0, 100)          | —               |
//!
//! Values outside a hard range abort with an [`ItmError`]; values outside a
//! design range only raise a [`Warnings`] flag.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ItmError, ItmResult, Warnings};

/// Radio climate region, selecting one row of the tabulated variability
/// constants from NBS TN-101 chapter 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RadioClimate {
    Equatorial,
    ContinentalSubtropical,
    MaritimeSubtropical,
    Desert,
    ContinentalTemperate,
    MaritimeTemperateOverLand,
    MaritimeTemperateOverSea,
}

impl Default for RadioClimate {
    fn default() -> Self {
        RadioClimate::ContinentalTemperate
    }
}

/// Mode of variability: which of the time/location/situation axes behave as
/// random variables and which as fixed confidences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariabilityMode {
    /// One message, one location: all three axes collapse into a single
    /// confidence.
    SingleMessage,
    /// A single random event; time and situation form the confidence.
    Accidental,
    /// A mobile terminal: time and location form a joint random axis.
    Mobile,
    /// Broadcast service planning: all three axes kept separate.
    Broadcast,
}

impl Default for VariabilityMode {
    fn default() -> Self {
        VariabilityMode::Broadcast
    }
}

/// Antenna polarization. Only the ground-impedance derivation depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Polarization {
    Horizontal,
    Vertical,
}

impl Default for Polarization {
    fn default() -> Self {
        Polarization::Horizontal
    }
}

/// Area-mode siting criteria: how carefully a terminal was placed to
/// communicate with its counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SitingCriteria {
    Random,
    Careful,
    VeryCareful,
}

/// Dominant propagation mechanism reported with a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropagationMode {
    NotSet,
    LineOfSight,
    Diffraction,
    Troposcatter,
}

impl Default for PropagationMode {
    fn default() -> Self {
        PropagationMode::NotSet
    }
}

impl fmt::Display for PropagationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PropagationMode::NotSet => "not set",
            PropagationMode::LineOfSight => "line-of-sight",
            PropagationMode::Diffraction => "diffraction",
            PropagationMode::Troposcatter => "troposcatter",
        };
        write!(f, "{s}")
    }
}

/// Complete parameter set for one prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItmParams {
    /// Structural height of the transmitter above ground, in meters.
    pub tx_height_m: f64,
    /// Structural height of the receiver above ground, in meters.
    pub rx_height_m: f64,
    /// Carrier frequency in MHz.
    pub frequency_mhz: f64,
    /// Antenna polarization.
    pub polarization: Polarization,
    /// Relative permittivity of the ground (dielectric constant).
    pub permittivity: f64,
    /// Ground conductivity in S/m.
    pub conductivity_s_per_m: f64,
    /// Minimum monthly mean surface refractivity, in N-units.
    pub refractivity_n: f64,
    /// Radio climate region.
    pub climate: RadioClimate,
    /// Mode of variability.
    pub variability: VariabilityMode,
    /// Time percentage, 0 < t < 100.
    pub time_percent: f64,
    /// Location percentage, 0 < l < 100.
    pub location_percent: f64,
    /// Situation percentage, 0 < s < 100.
    pub situation_percent: f64,
}

impl Default for ItmParams {
    fn default() -> Self {
        Self {
            tx_height_m: 10.0,
            rx_height_m: 10.0,
            frequency_mhz: 100.0,
            polarization: Polarization::default(),
            permittivity: 15.0,
            conductivity_s_per_m: 0.005,
            refractivity_n: 301.0,
            climate: RadioClimate::default(),
            variability: VariabilityMode::default(),
            time_percent: 50.0,
            location_percent: 50.0,
            situation_percent: 50.0,
        }
    }
}

impl ItmParams {
    /// Create a builder pre-loaded with the defaults above.
    pub fn builder() -> ItmParamsBuilder {
        ItmParamsBuilder::default()
    }

    /// Check all hard and soft ranges.
    ///
    /// Returns the accumulated soft-range warnings, or the first hard-range
    /// violation encountered.
    pub fn validate(&self) -> ItmResult<Warnings> {
        let mut warnings = Warnings::empty();

        if !(1.0..=1000.0).contains(&self.tx_height_m) {
            warnings |= Warnings::TX_HEIGHT;
        }
        if !(0.5..=3000.0).contains(&self.tx_height_m) {
            return Err(ItmError::TxHeightOutOfRange(self.tx_height_m));
        }
        if !(1.0..=1000.0).contains(&self.rx_height_m) {
            warnings |= Warnings::RX_HEIGHT;
        }
        if !(0.5..=3000.0).contains(&self.rx_height_m) {
            return Err(ItmError::RxHeightOutOfRange(self.rx_height_m));
        }
        if !(250.0..=400.0).contains(&self.refractivity_n) {
            return Err(ItmError::RefractivityOutOfRange(self.refractivity_n));
        }
        if !(40.0..=10_000.0).contains(&self.frequency_mhz) {
            warnings |= Warnings::FREQUENCY;
        }
        if !(20.0..=20_000.0).contains(&self.frequency_mhz) {
            return Err(ItmError::FrequencyOutOfRange(self.frequency_mhz));
        }
        if self.permittivity < 1.0 {
            return Err(ItmError::PermittivityOutOfRange(self.permittivity));
        }
        if self.conductivity_s_per_m <= 0.0 {
            return Err(ItmError::ConductivityOutOfRange(self.conductivity_s_per_m));
        }
        if self.time_percent <= 0.0 || self.time_percent >= 100.0 {
            return Err(ItmError::TimePercentOutOfRange(self.time_percent));
        }
        if self.location_percent <= 0.0 || self.location_percent >= 100.0 {
            return Err(ItmError::LocationPercentOutOfRange(self.location_percent));
        }
        if self.situation_percent <= 0.0 || self.situation_percent >= 100.0 {
            return Err(ItmError::SituationPercentOutOfRange(self.situation_percent));
        }

        Ok(warnings)
    }
}

/// Builder for [`ItmParams`].
#[derive(Debug, Default)]
pub struct ItmParamsBuilder {
    params: ItmParams,
}

impl ItmParamsBuilder {
    /// Structural heights of transmitter and receiver, in meters.
    pub fn heights(mut self, tx_m: f64, rx_m: f64) -> Self {
        self.params.tx_height_m = tx_m;
        self.params.rx_height_m = rx_m;
        self
    }

    /// Carrier frequency in MHz.
    pub fn frequency(mut self, mhz: f64) -> Self {
        self.params.frequency_mhz = mhz;
        self
    }

    pub fn polarization(mut self, pol: Polarization) -> Self {
        self.params.polarization = pol;
        self
    }

    /// Ground electrical parameters: relative permittivity and conductivity.
    pub fn ground(mut self, permittivity: f64, conductivity_s_per_m: f64) -> Self {
        self.params.permittivity = permittivity;
        self.params.conductivity_s_per_m = conductivity_s_per_m;
        self
    }

    /// Surface refractivity in N-units.
    pub fn refractivity(mut self, n_units: f64) -> Self {
        self.params.refractivity_n = n_units;
        self
    }

    pub fn climate(mut self, climate: RadioClimate) -> Self {
        self.params.climate = climate;
        self
    }

    pub fn variability(mut self, mode: VariabilityMode) -> Self {
        self.params.variability = mode;
        self
    }

    /// Time, location, and situation percentages, each in (0, 100).
    pub fn percentages(mut self, time: f64, location: f64, situation: f64) -> Self {
        self.params.time_percent = time;
        self.params.location_percent = location;
        self.params.situation_percent = situation;
        self
    }

    pub fn build(self) -> ItmParams {
        self.params
    }
}
