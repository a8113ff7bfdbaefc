//! Motor activity and status snapshots.

use core::fmt;

/// Outcome of one scheduler tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickStatus {
    /// Nothing left to do.
    #[default]
    Idle,
    /// Steps remain or the step period is still running.
    Busy,
}

impl TickStatus {
    /// Whether work remains.
    #[inline]
    pub const fn is_busy(self) -> bool {
        matches!(self, TickStatus::Busy)
    }

    /// Combine the status of two motors.
    #[inline]
    pub const fn merge(self, other: Self) -> Self {
        if self.is_busy() || other.is_busy() {
            TickStatus::Busy
        } else {
            TickStatus::Idle
        }
    }
}

/// Point-in-time view of a motor for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotorStatus {
    /// Position in steps
    pub position: i32,
    /// Effective step period in ticks
    pub step_period: u16,
    /// Steps left in the current move
    pub steps_remaining: i32,
    /// Ramp counter
    pub ramp_counter: i32,
}

impl MotorStatus {
    /// Whether the motor has nothing left to do.
    #[inline]
    pub const fn is_idle(&self) -> bool {
        self.steps_remaining == 0
    }
}

impl fmt::Display for MotorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pos: {:>5}, delay: {:>2}, steps: {}",
            self.position, self.step_period, self.steps_remaining
        )
    }
}
