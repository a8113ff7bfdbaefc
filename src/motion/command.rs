//! Move commands and motion direction.

/// Direction of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Forward (clockwise, positive step count).
    Forward,
    /// Backward (counter-clockwise, negative step count).
    Backward,
}

impl Direction {
    /// Get direction from a signed step count.
    ///
    /// Zero maps to `Forward`.
    #[inline]
    pub fn from_steps(steps: i32) -> Self {
        if steps >= 0 {
            Direction::Forward
        } else {
            Direction::Backward
        }
    }

    /// Get the sign multiplier.
    #[inline]
    pub fn sign(self) -> i32 {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }
}

/// How an absolute angle target is reached on the dial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MoveMode {
    /// Always turn clockwise (non-negative step count).
    Clockwise,
    /// Always turn counter-clockwise (non-positive step count).
    CounterClockwise,
    /// Take the shorter way around.
    #[default]
    Shortest,
}

/// Acceleration/deceleration shaping for a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Ramp {
    /// Accelerate at the start of the move.
    pub up: bool,
    /// Decelerate towards the end of the move.
    pub down: bool,
}

impl Ramp {
    /// No shaping: every step uses the base period.
    pub const NONE: Self = Self { up: false, down: false };
    /// Accelerate and decelerate.
    pub const BOTH: Self = Self { up: true, down: true };

    /// Create a ramp setting.
    #[inline]
    pub const fn new(up: bool, down: bool) -> Self {
        Self { up, down }
    }

    /// Whether any shaping is enabled.
    #[inline]
    pub const fn is_active(self) -> bool {
        self.up || self.down
    }
}

/// The move field group written into a motor in one go.
///
/// A command is an immutable snapshot: arming a motor replaces its pending
/// move as a whole, never field by field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MoveCommand {
    /// Signed steps to issue (positive = forward).
    pub steps: i32,
    /// Ticks between steps before ramp shaping (0 = fastest).
    pub step_period: u16,
    /// Ramp shaping.
    pub ramp: Ramp,
}

impl MoveCommand {
    /// Create a move without ramp shaping.
    #[inline]
    pub const fn new(steps: i32, step_period: u16) -> Self {
        Self {
            steps,
            step_period,
            ramp: Ramp::NONE,
        }
    }

    /// Set ramp shaping.
    #[inline]
    pub const fn with_ramp(mut self, ramp: Ramp) -> Self {
        self.ramp = ramp;
        self
    }

    /// Direction of travel.
    #[inline]
    pub fn direction(&self) -> Direction {
        Direction::from_steps(self.steps)
    }
}
