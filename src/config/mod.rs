//! Configuration module for stepper-clock.
//!
//! Provides types for loading and validating the clock array, homing and
//! motor configuration from TOML files (with `std` feature) or pre-parsed
//! data.

mod clock;
mod homing;
mod motor;
mod system;
pub mod units;
#[cfg(feature = "std")]
mod loader;
mod validation;

pub use clock::{ClockConfig, DEFAULT_STEPS_PER_REVOLUTION, DEFAULT_TICK_PERIOD_US};
pub use homing::{HomingConfig, PhaseTiming};
pub use motor::MotorConfig;
pub use system::SystemConfig;
pub use validation::validate_config;

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};

// Re-export unit types at config level
pub use units::Degrees;
