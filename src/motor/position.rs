//! Position tracking for clock hands.
//!
//! Positions are signed step counts relative to twelve o'clock and are not
//! reduced modulo a revolution until explicitly normalized.

use crate::config::units::Degrees;
use crate::error::Result;
use crate::motion::planner::{normalize_steps, plan_path};
use crate::motion::MoveMode;

/// Hand position tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Current position in steps (from twelve o'clock)
    steps: i32,
    /// Steps for one full revolution of the hand
    steps_per_revolution: u32,
}

impl Position {
    /// Create a new position tracker at twelve o'clock.
    #[inline]
    pub const fn new(steps_per_revolution: u32) -> Self {
        Self {
            steps: 0,
            steps_per_revolution,
        }
    }

    /// Create a position tracker at a specific position.
    #[inline]
    pub const fn at(steps: i32, steps_per_revolution: u32) -> Self {
        Self {
            steps,
            steps_per_revolution,
        }
    }

    /// Current position in steps.
    #[inline]
    pub const fn steps(&self) -> i32 {
        self.steps
    }

    /// Position reduced to `[0, steps_per_revolution)`.
    #[inline]
    pub fn normalized(&self) -> i32 {
        normalize_steps(self.steps, self.steps_per_revolution)
    }

    /// Current hand angle in `[0, 360)` degrees.
    #[inline]
    pub fn degrees(&self) -> Degrees {
        Degrees(self.normalized() as f32 * 360.0 / self.steps_per_revolution as f32)
    }

    /// Set position in steps.
    #[inline]
    pub fn set(&mut self, steps: i32) {
        self.steps = steps;
    }

    /// Move by a number of steps.
    #[inline]
    pub fn move_steps(&mut self, delta: i32) {
        self.steps = self.steps.wrapping_add(delta);
    }

    /// Reduce the stored position to one revolution.
    #[inline]
    pub fn normalize(&mut self) {
        self.steps = self.normalized();
    }

    /// Steps per revolution.
    #[inline]
    pub const fn steps_per_revolution(&self) -> u32 {
        self.steps_per_revolution
    }

    /// Signed steps needed to reach `target` using `mode`.
    ///
    /// # Errors
    ///
    /// Returns `MotionError::InvalidAngle` for non-finite targets.
    #[inline]
    pub fn steps_to(&self, target: Degrees, mode: MoveMode) -> Result<i32> {
        plan_path(target, mode, self.steps, self.steps_per_revolution)
    }
}
