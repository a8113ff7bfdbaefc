//! Acceleration policy.
//!
//! A move with ramp shaping carries a ramp counter. While accelerating the
//! counter climbs by one per step; while decelerating it falls by two per
//! step. The counter is mapped through [`ramp_delay_increment`] to the extra
//! ticks added on top of the move's base step period, so a low counter means
//! a slow step and a counter past [`RAMP_HORIZON`] means full speed.

/// Number of steps over which a ramp is applied.
pub const RAMP_HORIZON: i32 = 300;

/// Extra delay ticks for a given ramp counter.
///
/// | counter | increment |
/// |---|---|
/// | <= 50 | 10 |
/// | 51-100 | 7 |
/// | 101-150 | 5 |
/// | 151-250 | 3 |
/// | 251-300 | 1 |
/// | > 300 | 0 |
#[inline]
pub const fn ramp_delay_increment(steps: i32) -> u16 {
    if steps <= 50 {
        10
    } else if steps <= 100 {
        7
    } else if steps <= 150 {
        5
    } else if steps <= 250 {
        3
    } else if steps <= RAMP_HORIZON {
        1
    } else {
        0
    }
}

/// Advance the ramp counter by one accelerating step.
///
/// Stops one past the horizon, where the increment reaches zero.
#[inline]
pub const fn advance_ramp_up(counter: i32) -> i32 {
    if counter <= RAMP_HORIZON {
        counter + 1
    } else {
        counter
    }
}

/// Advance the ramp counter by one decelerating step.
///
/// Deceleration moves the counter twice as fast as acceleration. Once the
/// counter has gone negative only the second decrement applies.
#[inline]
pub const fn advance_ramp_down(counter: i32) -> i32 {
    let counter = if counter >= 0 { counter - 1 } else { counter };
    counter.saturating_sub(1)
}
