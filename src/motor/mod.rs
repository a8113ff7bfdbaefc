//! Motor module for stepper-clock.
//!
//! Provides the per-hand motor record with its tick state machine, the
//! backend and sensor traits, and the registry of all hands.

mod backend;
mod builder;
mod driver;
mod emulated;
mod id;
mod position;
mod shared;
pub mod state;
mod system;

pub use backend::{HomeSensor, NoSensor, PinSensor, PinStepper, StepperBackend};
pub use builder::MotorBuilder;
pub use driver::Motor;
pub use emulated::{EmulatedSensor, EmulatedShaft, EmulatedStepper};
pub use id::{ClockLayout, MotorId, MAX_MOTORS};
pub use position::Position;
pub use shared::SharedRegistry;
pub use state::{MotorStatus, TickStatus};
pub(crate) use system::collect_set;
pub use system::{MotorRegistry, MotorSet};
