//! Clock array geometry and tick timing.

use serde::Deserialize;

use crate::motor::ClockLayout;

/// Default tick period of the stepping timer in microseconds.
///
/// Together with a motor's step period this sets the real-world step rate:
/// a step period of `p` ticks yields one step every `(p + 1) * 200 us`.
pub const DEFAULT_TICK_PERIOD_US: u32 = 200;

/// Default steps per full revolution of a clock hand.
pub const DEFAULT_STEPS_PER_REVOLUTION: u32 = 4320;

/// Clock array configuration from TOML (`[clock]` table).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Steps for one 360 degree turn of a hand.
    pub steps_per_revolution: u32,

    /// Period of the timer that drives the tick scheduler.
    pub tick_period_us: u32,

    /// Number of clocks in the array.
    pub clocks: u8,

    /// Hands (motors) per clock.
    pub hands_per_clock: u8,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            steps_per_revolution: DEFAULT_STEPS_PER_REVOLUTION,
            tick_period_us: DEFAULT_TICK_PERIOD_US,
            clocks: 4,
            hands_per_clock: 2,
        }
    }
}

impl ClockConfig {
    /// Clock/hand addressing for this array.
    #[inline]
    pub fn layout(&self) -> ClockLayout {
        ClockLayout::new(self.clocks, self.hands_per_clock)
    }

    /// Steps per degree of hand rotation.
    #[inline]
    pub fn steps_per_degree(&self) -> f32 {
        self.steps_per_revolution as f32 / 360.0
    }

    /// Ticks per millisecond, at least 1.
    #[inline]
    pub fn ticks_per_ms(&self) -> u32 {
        (1000 / self.tick_period_us.max(1)).max(1)
    }

    /// Tick period in nanoseconds.
    #[inline]
    pub fn tick_period_ns(&self) -> u32 {
        self.tick_period_us.saturating_mul(1000)
    }

    /// Step rate in steps per second for a step period (in ticks).
    ///
    /// A step fires once the period counter has run down, so a period of
    /// `p` ticks spaces steps `p + 1` ticks apart.
    #[inline]
    pub fn step_rate_hz(&self, step_period: u16) -> f32 {
        let ticks = step_period as f32 + 1.0;
        1_000_000.0 / (ticks * self.tick_period_us.max(1) as f32)
    }

    /// Time in milliseconds to issue `steps` at a constant step period.
    ///
    /// Saturates at `u32::MAX`.
    #[inline]
    pub fn move_duration_ms(&self, steps: u32, step_period: u16) -> u32 {
        let ticks = steps as u64 * (step_period as u64 + 1);
        let micros = ticks.saturating_mul(self.tick_period_us as u64);
        u32::try_from(micros / 1000).unwrap_or(u32::MAX)
    }
}
