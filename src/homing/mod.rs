//! Homing module for stepper-clock.
//!
//! Sensor-guided zero calibration: the generic convergence loop, the offset
//! store contract and the calibrator that strings the phases together.

mod calibrator;
mod convergence;
mod store;

pub use calibrator::{OffsetTable, ZeroCalibrator};
pub use convergence::{converge, converge_sensor, SensorTarget};
pub use store::{MemoryOffsetStore, OffsetStore};
