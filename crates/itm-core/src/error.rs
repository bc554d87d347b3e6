//! Error and warning types for the propagation model.
//!
//! Hard range violations abort a prediction and are reported as [`ItmError`]
//! values naming the offending parameter. Soft range violations accumulate
//! into a [`Warnings`] bit-set which is returned alongside the result: the
//! model was only *designed* for the soft ranges, but it still produces a
//! number outside them.

use serde::{Deserialize, Serialize};

/// Result alias used throughout the crate.
pub type ItmResult<T> = Result<T, ItmError>;

/// Fatal input errors. Each variant carries the offending value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ItmError {
    #[error("transmitter height {0} m outside supported range 0.5 m ..= 3000 m")]
    TxHeightOutOfRange(f64),

    #[error("receiver height {0} m outside supported range 0.5 m ..= 3000 m")]
    RxHeightOutOfRange(f64),

    #[error("refractivity {0} N-units outside supported range 250 ..= 400")]
    RefractivityOutOfRange(f64),

    #[error("frequency {0} MHz outside supported range 20 MHz ..= 20 GHz")]
    FrequencyOutOfRange(f64),

    #[error("relative permittivity {0} must be >= 1")]
    PermittivityOutOfRange(f64),

    #[error("conductivity {0} S/m must be > 0")]
    ConductivityOutOfRange(f64),

    #[error("time percentage {0} must lie strictly between 0 and 100")]
    TimePercentOutOfRange(f64),

    #[error("location percentage {0} must lie strictly between 0 and 100")]
    LocationPercentOutOfRange(f64),

    #[error("situation percentage {0} must lie strictly between 0 and 100")]
    SituationPercentOutOfRange(f64),

    #[error("path distance {0} m must be positive")]
    PathDistanceNonPositive(f64),

    #[error("terrain irregularity {0} m must be non-negative")]
    NegativeDeltaH(f64),
}

/// Non-fatal warning flags, OR-ed together over the course of a prediction.
///
/// A set flag means the corresponding quantity fell outside the range the
/// model was validated against; the result should be used with caution.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
pub struct Warnings(u32);

impl Warnings {
    /// Transmitter height outside 1 m ..= 1000 m.
    pub const TX_HEIGHT: Warnings = Warnings(1 << 0);
    /// Receiver height outside 1 m ..= 1000 m.
    pub const RX_HEIGHT: Warnings = Warnings(1 << 1);
    /// Frequency outside 40 MHz ..= 10 GHz.
    pub const FREQUENCY: Warnings = Warnings(1 << 2);
    /// Transmitter horizon angle beyond the small-angle approximation.
    pub const TX_HORIZON_ANGLE: Warnings = Warnings(1 << 3);
    /// Receiver horizon angle beyond the small-angle approximation.
    pub const RX_HORIZON_ANGLE: Warnings = Warnings(1 << 4);
    /// Transmitter horizon closer than 1/10 the smooth-earth horizon.
    pub const TX_HORIZON_DISTANCE_LOW: Warnings = Warnings(1 << 5);
    /// Transmitter horizon beyond 3x the smooth-earth horizon.
    pub const TX_HORIZON_DISTANCE_HIGH: Warnings = Warnings(1 << 6);
    /// Receiver horizon closer than 1/10 the smooth-earth horizon.
    pub const RX_HORIZON_DISTANCE_LOW: Warnings = Warnings(1 << 7);
    /// Receiver horizon beyond 3x the smooth-earth horizon.
    pub const RX_HORIZON_DISTANCE_HIGH: Warnings = Warnings(1 << 8);
    /// Surface refractivity outside 250 ..= 400 N-units.
    pub const SURFACE_REFRACTIVITY: Warnings = Warnings(1 << 9);
    /// Effective earth radius outside 4000 km ..= 13333 km.
    pub const EFFECTIVE_EARTH: Warnings = Warnings(1 << 10);
    /// Ground impedance with non-dominant real part.
    pub const GROUND_IMPEDANCE: Warnings = Warnings(1 << 11);
    /// Path shorter than the height difference allows (steep slant path).
    pub const PATH_DISTANCE_SMALL_1: Warnings = Warnings(1 << 12);
    /// Path shorter than 1 km.
    pub const PATH_DISTANCE_SMALL_2: Warnings = Warnings(1 << 13);
    /// Path longer than 1000 km.
    pub const PATH_DISTANCE_BIG_1: Warnings = Warnings(1 << 14);
    /// Path longer than 2000 km.
    pub const PATH_DISTANCE_BIG_2: Warnings = Warnings(1 << 15);

    /// An empty set.
    pub const fn empty() -> Self {
        Warnings(0)
    }

    /// Raw bit representation.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// True when no flag is set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True when every flag in `other` is also set in `self`.
    pub const fn contains(self, other: Warnings) -> bool {
        self.0 & other.0 == other.0
    }

    /// Set all flags of `other`.
    pub fn insert(&mut self, other: Warnings) {
        self.0 |= other.0;
    }
}

impl std::ops::BitOr for Warnings {
    type Output = Warnings;

    fn bitor(self, rhs: Warnings) -> Warnings {
        Warnings(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for Warnings {
    fn bitor_assign(&mut self, rhs: Warnings) {
        self.0 |= rhs.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warnings_insert_contains() {
        let mut w = Warnings::empty();
        assert!(w.is_empty());
        w.insert(Warnings::TX_HEIGHT);
        w |= Warnings::FREQUENCY;
        assert!(w.contains(Warnings::TX_HEIGHT));
        assert!(w.contains(Warnings::FREQUENCY));
        assert!(!w.contains(Warnings::RX_HEIGHT));
        assert!(!w.is_empty());
    }

    #[test]
    fn test_warnings_bitor() {
        let w = Warnings::TX_HORIZON_ANGLE | Warnings::RX_HORIZON_ANGLE;
        assert_eq!(w.bits(), (1 << 3) | (1 << 4));
    }

    #[test]
    fn test_error_messages_name_the_value() {
        let err = ItmError::TxHeightOutOfRange(0.2);
        assert!(err.to_string().contains("0.2"));
        let err = ItmError::FrequencyOutOfRange(15.0);
        assert!(err.to_string().contains("15"));
    }
}
