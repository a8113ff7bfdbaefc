//! Motor addressing within the clock array.

use core::fmt;

use crate::error::{MotorError, Result};

/// Maximum number of motors a registry can hold.
pub const MAX_MOTORS: usize = 16;

/// Stable handle of a motor in the registry.
///
/// Motors are numbered clock by clock: `clock * hands_per_clock + hand`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotorId(pub u8);

impl MotorId {
    /// Raw index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for MotorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M{}", self.0)
    }
}

/// Geometry of the clock array: `clocks` clocks with `hands_per_clock`
/// hands each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockLayout {
    clocks: u8,
    hands_per_clock: u8,
}

impl ClockLayout {
    /// Create a layout.
    #[inline]
    pub const fn new(clocks: u8, hands_per_clock: u8) -> Self {
        Self {
            clocks,
            hands_per_clock,
        }
    }

    /// Number of clocks.
    #[inline]
    pub const fn clocks(&self) -> u8 {
        self.clocks
    }

    /// Hands per clock.
    #[inline]
    pub const fn hands_per_clock(&self) -> u8 {
        self.hands_per_clock
    }

    /// Total number of motor slots.
    #[inline]
    pub const fn motor_count(&self) -> usize {
        self.clocks as usize * self.hands_per_clock as usize
    }

    /// Motor id of a clock hand.
    ///
    /// # Errors
    ///
    /// Returns `MotorError::ClockOutOfRange` / `HandOutOfRange` for indices
    /// outside the layout.
    pub fn id(&self, clock: u8, hand: u8) -> Result<MotorId> {
        if clock >= self.clocks {
            return Err(MotorError::ClockOutOfRange {
                clock,
                clocks: self.clocks,
            }
            .into());
        }
        if hand >= self.hands_per_clock {
            return Err(MotorError::HandOutOfRange {
                hand,
                hands_per_clock: self.hands_per_clock,
            }
            .into());
        }
        let index = clock as usize * self.hands_per_clock as usize + hand as usize;
        if index >= MAX_MOTORS {
            return Err(MotorError::RegistryFull.into());
        }
        Ok(MotorId(index as u8))
    }

    /// Clock and hand of a motor id, if it lies inside the layout.
    pub fn locate(&self, id: MotorId) -> Option<(u8, u8)> {
        if self.hands_per_clock == 0 || id.index() >= self.motor_count() {
            return None;
        }
        Some((id.0 / self.hands_per_clock, id.0 % self.hands_per_clock))
    }

    /// Iterate over all motor ids of one clock.
    ///
    /// # Errors
    ///
    /// Returns `MotorError::ClockOutOfRange` for an unknown clock.
    pub fn clock_ids(&self, clock: u8) -> Result<impl Iterator<Item = MotorId>> {
        let first = self.id(clock, 0)?;
        Ok((0..self.hands_per_clock).map(move |hand| MotorId(first.0 + hand)))
    }
}
