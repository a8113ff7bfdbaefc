//! Builder pattern for Motor.

use crate::config::{ClockConfig, MotorConfig};
use crate::error::{MotorError, Result};

use super::backend::{HomeSensor, NoSensor, StepperBackend};
use super::driver::Motor;
use super::id::MotorId;
use super::position::Position;

/// Builder for creating Motor instances.
pub struct MotorBuilder<D, S = NoSensor>
where
    D: StepperBackend,
    S: HomeSensor,
{
    id: Option<MotorId>,
    name: Option<heapless::String<32>>,
    backend: Option<D>,
    sensor: Option<S>,
    steps_per_revolution: Option<u32>,
    position: i32,
    requires_sensor: bool,
}

impl<D, S> Default for MotorBuilder<D, S>
where
    D: StepperBackend,
    S: HomeSensor,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<D, S> MotorBuilder<D, S>
where
    D: StepperBackend,
    S: HomeSensor,
{
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            id: None,
            name: None,
            backend: None,
            sensor: None,
            steps_per_revolution: None,
            position: 0,
            requires_sensor: false,
        }
    }

    /// Set the registry slot.
    pub fn id(mut self, id: MotorId) -> Self {
        self.id = Some(id);
        self
    }

    /// Set the motor name.
    pub fn name(mut self, name: &str) -> Self {
        self.name = heapless::String::try_from(name).ok();
        self
    }

    /// Set the stepping backend.
    pub fn backend(mut self, backend: D) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Fit a home sensor.
    pub fn sensor(mut self, sensor: S) -> Self {
        self.sensor = Some(sensor);
        self
    }

    /// Set steps per revolution of the hand.
    pub fn steps_per_revolution(mut self, steps: u32) -> Self {
        self.steps_per_revolution = Some(steps);
        self
    }

    /// Set the initial position in steps.
    pub fn position(mut self, steps: i32) -> Self {
        self.position = steps;
        self
    }

    /// Configure id, name and revolution from configuration.
    ///
    /// A motor configured with `has_sensor` must be given a sensor before
    /// `build`.
    ///
    /// # Errors
    ///
    /// Returns `MotorError::ClockOutOfRange` / `HandOutOfRange` if the motor
    /// does not fit the clock layout.
    pub fn from_config(mut self, name: &str, motor: &MotorConfig, clock: &ClockConfig) -> Result<Self> {
        self.id = Some(clock.layout().id(motor.clock, motor.hand)?);
        self.name = heapless::String::try_from(name).ok();
        self.steps_per_revolution = Some(clock.steps_per_revolution);
        self.requires_sensor = motor.has_sensor;
        Ok(self)
    }

    /// Build the Motor.
    ///
    /// # Errors
    ///
    /// Returns `MotorError::MissingField` if id, backend or steps per
    /// revolution are missing, and `MotorError::NoSensor` if a required
    /// sensor was not given.
    pub fn build(self) -> Result<Motor<D, S>> {
        let id = self.id.ok_or(MotorError::MissingField("id"))?;
        let backend = self.backend.ok_or(MotorError::MissingField("backend"))?;
        let steps_per_revolution = self
            .steps_per_revolution
            .ok_or(MotorError::MissingField("steps_per_revolution"))?;

        if self.requires_sensor && self.sensor.is_none() {
            return Err(MotorError::NoSensor(id).into());
        }

        let name = match self.name {
            Some(name) => name,
            None => default_name(id),
        };

        Ok(Motor::new(
            id,
            name,
            backend,
            self.sensor,
            Position::at(self.position, steps_per_revolution),
        ))
    }
}

fn default_name(id: MotorId) -> heapless::String<32> {
    let mut name = heapless::String::new();
    // "M" plus at most three digits always fits
    let _ = core::fmt::write(&mut name, format_args!("{}", id));
    name
}
