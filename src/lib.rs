//! # stepper-clock
//!
//! Motion core for clocks whose hands are driven by stepper motors.
//!
//! ## Features
//!
//! - **Tick scheduler**: one call per timer interrupt issues at most one step per hand
//! - **Ramping**: table-driven acceleration and deceleration of the step period
//! - **Dial path planning**: clockwise, counter-clockwise or shortest way to an angle
//! - **Zero calibration**: sensor-guided homing with stored per-hand offsets
//! - **embedded-hal 1.0**: `OutputPin` STEP/DIR backends, `InputPin` sensors, `DelayNs` waits
//! - **no_std compatible**: Core library works without standard library
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stepper_clock::{Degrees, MoveMode, Ramp, SharedRegistry, MotorRegistry, Sequencer};
//!
//! let config = stepper_clock::load_config("clock.toml")?;
//! let registry = MotorRegistry::from_config(&config, |_, id, motor| {
//!     Ok((backend_for(id, motor), Some(sensor_for(id))))
//! })?;
//! let clock = SharedRegistry::new(registry);
//!
//! // timer interrupt, every `tick_period_us`
//! clock.tick();
//!
//! // foreground
//! let minute = clock.with(|r| r.id(0, 1))?;
//! clock.with(|r| r.move_to_angle(minute, Degrees::from_minute(15), MoveMode::Shortest, 4, Ramp::BOTH))?;
//! Sequencer::new(&clock, delay).move_and_wait(10);
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables file I/O and TOML parsing
//! - `defmt`: Enables defmt logging for embedded targets
//! - `log`: Enables logging through the `log` facade

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

#[macro_use]
mod logging;

// Core modules
pub mod config;
pub mod error;
pub mod homing;
pub mod motion;
pub mod motor;
pub mod sequencer;

// Re-exports for ergonomic API
pub use config::{validate_config, ClockConfig, HomingConfig, MotorConfig, PhaseTiming, SystemConfig};
pub use error::{Error, Result};
pub use homing::{MemoryOffsetStore, OffsetStore, SensorTarget, ZeroCalibrator};
pub use motion::{plan_path, relative_steps, Direction, MoveCommand, MoveMode, Ramp};
pub use motor::{
    state, ClockLayout, HomeSensor, Motor, MotorBuilder, MotorId, MotorRegistry, SharedRegistry,
    StepperBackend, TickStatus,
};
pub use sequencer::{Sequencer, TickingDelay};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};

// Unit types
pub use config::units::{Degrees, UnitExt};
