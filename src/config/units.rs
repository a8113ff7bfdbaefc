//! Unit types for physical quantities.
//!
//! Hand angles are given in degrees; everything below the planner works in
//! whole motor steps.

use core::ops::{Add, Neg, Sub};

use serde::Deserialize;

/// Angular position or distance in degrees.
///
/// Used for configuration and user-facing API. Converted to steps by the
/// [`planner`](crate::motion::planner).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize)]
#[serde(transparent)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Degrees(pub f32);

impl Degrees {
    /// Twelve o'clock.
    pub const ZERO: Self = Self(0.0);

    /// Create a new Degrees value.
    #[inline]
    pub const fn new(value: f32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f32 {
        self.0
    }

    /// Angle of a clock hand pointing at `hour` (0-11) and `minute`.
    ///
    /// Hour hands advance continuously with the minutes.
    #[inline]
    pub fn from_hour(hour: u8, minute: u8) -> Self {
        Self(((hour % 12) as f32 * 30.0) + (minute % 60) as f32 * 0.5)
    }

    /// Angle of a minute hand pointing at `minute` (0-59).
    #[inline]
    pub fn from_minute(minute: u8) -> Self {
        Self((minute % 60) as f32 * 6.0)
    }
}

impl Add for Degrees {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Degrees {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Neg for Degrees {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

/// Extension trait for creating unit types from primitives.
pub trait UnitExt {
    /// Convert to Degrees.
    fn degrees(self) -> Degrees;
}

impl UnitExt for f32 {
    #[inline]
    fn degrees(self) -> Degrees {
        Degrees(self)
    }
}

impl UnitExt for i32 {
    #[inline]
    fn degrees(self) -> Degrees {
        Degrees(self as f32)
    }
}
