//! Motion module for stepper-clock.
//!
//! Provides the acceleration policy, the dial path planner and the move
//! command snapshot handed to motors.

mod command;
pub mod planner;
pub mod ramp;

pub use command::{Direction, MoveCommand, MoveMode, Ramp};
pub use planner::{degrees_to_steps, normalize_degrees, normalize_steps, plan_path, relative_steps};
pub use ramp::{advance_ramp_down, advance_ramp_up, ramp_delay_increment, RAMP_HORIZON};
