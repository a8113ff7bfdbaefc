//! Homing (zero calibration) configuration.

use serde::Deserialize;

/// Timing of one sensor convergence phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhaseTiming {
    /// Signed steps issued per round to every motor not yet converged.
    pub step: i32,

    /// Wait between rounds in milliseconds.
    pub poll_ms: u32,

    /// Bound on the whole phase in milliseconds.
    pub timeout_ms: u32,
}

impl PhaseTiming {
    /// Create phase timing.
    pub const fn new(step: i32, poll_ms: u32, timeout_ms: u32) -> Self {
        Self {
            step,
            poll_ms,
            timeout_ms,
        }
    }

    pub(crate) fn is_valid(&self) -> bool {
        self.step != 0 && self.poll_ms > 0
    }
}

/// Homing configuration (`[homing]` table).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HomingConfig {
    /// Step period (ticks) used for every homing move.
    pub step_period: u16,

    /// Relative move applied to hands that start on their sensor.
    pub escape_degrees: f32,

    /// Poll interval while waiting for escape/offset moves to finish.
    pub settle_ms: u32,

    /// Bound on escape and offset moves.
    pub move_timeout_ms: u32,

    /// Seek the sensor in large forward steps.
    pub coarse_seek: PhaseTiming,

    /// Step back until the sensor releases.
    pub fine_backoff: PhaseTiming,

    /// Step forward until the sensor triggers again.
    pub fine_reseek: PhaseTiming,

    /// Reference calibration: seek the sensor from twelve o'clock.
    pub reference_seek: PhaseTiming,

    /// Reference calibration: step off the sensor.
    pub reference_backoff: PhaseTiming,

    /// Reference calibration: step back onto the sensor edge.
    pub reference_reseek: PhaseTiming,
}

impl Default for HomingConfig {
    fn default() -> Self {
        Self {
            step_period: 6,
            escape_degrees: 90.0,
            settle_ms: 10,
            move_timeout_ms: 5000,
            coarse_seek: PhaseTiming::new(10, 10, 10_000),
            fine_backoff: PhaseTiming::new(-1, 10, 10_000),
            fine_reseek: PhaseTiming::new(1, 2, 10_000),
            reference_seek: PhaseTiming::new(-10, 5, 10_000),
            reference_backoff: PhaseTiming::new(1, 2, 10_000),
            reference_reseek: PhaseTiming::new(-1, 2, 10_000),
        }
    }
}

impl HomingConfig {
    /// All phase timings with their names, in execution order.
    pub fn phases(&self) -> [(&'static str, &PhaseTiming); 6] {
        [
            ("coarse_seek", &self.coarse_seek),
            ("fine_backoff", &self.fine_backoff),
            ("fine_reseek", &self.fine_reseek),
            ("reference_seek", &self.reference_seek),
            ("reference_backoff", &self.reference_backoff),
            ("reference_reseek", &self.reference_reseek),
        ]
    }
}
