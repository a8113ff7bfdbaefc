//! Angle-to-step path planning on the circular dial.
//!
//! Positions are kept unwrapped by the tick scheduler; the planner folds
//! them onto `[0, steps_per_revolution)` before computing a delta.

use libm::{fmodf, roundf};

use crate::config::units::Degrees;
use crate::error::{MotionError, Result};

use super::command::MoveMode;

/// Fold an angle onto `[0, 360)`.
///
/// # Errors
///
/// Returns `MotionError::InvalidAngle` for NaN or infinite input.
pub fn normalize_degrees(degrees: Degrees) -> Result<Degrees> {
    let value = finite(degrees)?;
    let mut folded = fmodf(value, 360.0);
    if folded < 0.0 {
        folded += 360.0;
    }
    if folded >= 360.0 {
        // -1e-9 + 360.0 rounds up to 360.0 in f32
        folded = 0.0;
    }
    Ok(Degrees(folded))
}

/// Fold a raw step position onto `[0, steps_per_revolution)`.
#[inline]
pub fn normalize_steps(position: i32, steps_per_revolution: u32) -> i32 {
    position.rem_euclid(revolution(steps_per_revolution))
}

/// Convert an angle to a step count, rounding to the nearest step.
///
/// The angle is not normalized, so negative and multi-turn angles map to
/// negative and multi-turn step counts.
///
/// # Errors
///
/// Returns `MotionError::InvalidAngle` for NaN or infinite input and
/// `MotionError::Overflow` if the result does not fit the position range.
pub fn degrees_to_steps(degrees: Degrees, steps_per_revolution: u32) -> Result<i32> {
    let value = finite(degrees)?;
    let steps = roundf(steps_per_revolution as f32 * value / 360.0);
    if steps >= i32::MAX as f32 || steps <= i32::MIN as f32 {
        return Err(MotionError::Overflow.into());
    }
    Ok(steps as i32)
}

/// Steps for a relative move by `degrees` (may be negative).
///
/// # Errors
///
/// See [`degrees_to_steps`].
#[inline]
pub fn relative_steps(degrees: Degrees, steps_per_revolution: u32) -> Result<i32> {
    degrees_to_steps(degrees, steps_per_revolution)
}

/// Signed step count that takes a hand from `position` to the absolute
/// angle `target`, following `mode`.
///
/// - `Clockwise` yields a delta in `[0, steps_per_revolution)`.
/// - `CounterClockwise` yields a delta in `(-steps_per_revolution, 0]`.
/// - `Shortest` yields `|delta| <= steps_per_revolution / 2`; an exact half
///   turn keeps the sign of the raw difference.
///
/// # Errors
///
/// Returns `MotionError::InvalidAngle` for NaN or infinite targets.
pub fn plan_path(
    target: Degrees,
    mode: MoveMode,
    position: i32,
    steps_per_revolution: u32,
) -> Result<i32> {
    let rev = revolution(steps_per_revolution);
    let target = normalize_degrees(target)?;
    // rounding can land on a full turn, e.g. 359.9 deg
    let target_steps = degrees_to_steps(target, steps_per_revolution)?.rem_euclid(rev);
    let current = position.rem_euclid(rev);

    let mut delta = target_steps - current;
    match mode {
        MoveMode::Clockwise => {
            if delta < 0 {
                delta += rev;
            }
        }
        MoveMode::CounterClockwise => {
            if delta > 0 {
                delta -= rev;
            }
        }
        MoveMode::Shortest => {
            let half = rev / 2;
            if delta > half {
                delta -= rev;
            } else if delta < -half {
                delta += rev;
            }
        }
    }
    Ok(delta)
}

#[inline]
fn revolution(steps_per_revolution: u32) -> i32 {
    steps_per_revolution.clamp(1, i32::MAX as u32) as i32
}

#[inline]
fn finite(degrees: Degrees) -> Result<f32> {
    if degrees.0.is_finite() {
        Ok(degrees.0)
    } else {
        Err(MotionError::InvalidAngle(degrees.0).into())
    }
}
