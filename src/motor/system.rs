//! Motor registry for the whole clock array.
//!
//! Owns every motor record, addresses them by `MotorId` and translates
//! angle-level requests into move commands.

use heapless::Vec;

use crate::config::units::Degrees;
use crate::config::{MotorConfig, SystemConfig};
use crate::error::{MotorError, Result};
use crate::motion::{relative_steps, MoveCommand, MoveMode, Ramp};

use super::backend::{HomeSensor, NoSensor, StepperBackend};
use super::builder::MotorBuilder;
use super::driver::Motor;
use super::id::{ClockLayout, MotorId, MAX_MOTORS};
use super::state::{MotorStatus, TickStatus};

/// Set of motor ids, sized for the whole registry.
pub type MotorSet = Vec<MotorId, MAX_MOTORS>;

/// Collect ids into a set, skipping repeats.
///
/// Ids past the set's capacity are dropped; a registry never holds more
/// motors than that.
pub(crate) fn collect_set(ids: impl IntoIterator<Item = MotorId>) -> MotorSet {
    let mut set = MotorSet::new();
    for id in ids {
        if !set.contains(&id) && set.push(id).is_err() {
            break;
        }
    }
    set
}

/// All motors of a clock array.
///
/// `MotorRegistry` provides:
/// - Registration of motors against the clock layout
/// - Lookup by `MotorId` or (clock, hand)
/// - The array-wide scheduler tick
/// - Angle and step level move requests
///
/// # Example
///
/// ```rust,ignore
/// use stepper_clock::motor::MotorRegistry;
///
/// let config = stepper_clock::config::load_config("clock.toml")?;
/// let mut registry = MotorRegistry::from_config(&config, |name, id, motor| {
///     Ok((make_backend(id, motor.invert_direction), Some(make_sensor(id))))
/// })?;
///
/// let id = registry.id(0, 1)?;
/// registry.move_to_angle(id, Degrees(90.0), MoveMode::Shortest, 4, Ramp::BOTH)?;
/// ```
pub struct MotorRegistry<D, S = NoSensor>
where
    D: StepperBackend,
    S: HomeSensor,
{
    /// Clock array geometry.
    layout: ClockLayout,
    /// Steps for one revolution of any hand.
    steps_per_revolution: u32,
    /// Registered motors, in registration order.
    motors: Vec<Motor<D, S>, MAX_MOTORS>,
}

impl<D, S> MotorRegistry<D, S>
where
    D: StepperBackend,
    S: HomeSensor,
{
    /// Create an empty registry.
    pub const fn new(layout: ClockLayout, steps_per_revolution: u32) -> Self {
        Self {
            layout,
            steps_per_revolution,
            motors: Vec::new(),
        }
    }

    /// Create a registry holding every motor of a configuration.
    ///
    /// `make` supplies the backend and optional sensor for each configured
    /// motor.
    ///
    /// # Errors
    ///
    /// Returns the first error from `make`, from building a motor, or from
    /// registering it.
    pub fn from_config<F>(config: &SystemConfig, mut make: F) -> Result<Self>
    where
        F: FnMut(&str, MotorId, &MotorConfig) -> Result<(D, Option<S>)>,
    {
        let mut registry = Self::new(config.clock.layout(), config.clock.steps_per_revolution);

        for (name, motor) in config.motors.iter() {
            let builder = MotorBuilder::new().from_config(name, motor, &config.clock)?;
            let id = registry.layout.id(motor.clock, motor.hand)?;
            let (backend, sensor) = make(name, id, motor)?;
            let builder = builder.backend(backend);
            let builder = match sensor {
                Some(sensor) => builder.sensor(sensor),
                None => builder,
            };
            registry.register(builder.build()?)?;
        }

        Ok(registry)
    }

    /// Add a motor.
    ///
    /// # Errors
    ///
    /// Returns `MotorError::AlreadyRegistered` if the id is taken,
    /// `MotorError::ClockOutOfRange` if the id lies outside the layout,
    /// `MotorError::RevolutionMismatch` if the motor counts a revolution
    /// differently from the registry, and `MotorError::RegistryFull` when
    /// storage is exhausted.
    pub fn register(&mut self, motor: Motor<D, S>) -> Result<MotorId> {
        let id = motor.id();
        if self.layout.locate(id).is_none() {
            let hands = self.layout.hands_per_clock().max(1);
            return Err(MotorError::ClockOutOfRange {
                clock: id.0 / hands,
                clocks: self.layout.clocks(),
            }
            .into());
        }
        if self.contains(id) {
            return Err(MotorError::AlreadyRegistered(id).into());
        }
        let motor_spr = motor.position().steps_per_revolution();
        if motor_spr != self.steps_per_revolution {
            return Err(MotorError::RevolutionMismatch {
                id,
                motor: motor_spr,
                registry: self.steps_per_revolution,
            }
            .into());
        }
        self.motors
            .push(motor)
            .map_err(|_| MotorError::RegistryFull)?;
        log_debug!("registered motor {}", id.0);
        Ok(id)
    }

    /// Clock array geometry.
    #[inline]
    pub fn layout(&self) -> ClockLayout {
        self.layout
    }

    /// Steps per revolution.
    #[inline]
    pub fn steps_per_revolution(&self) -> u32 {
        self.steps_per_revolution
    }

    /// Number of registered motors.
    #[inline]
    pub fn len(&self) -> usize {
        self.motors.len()
    }

    /// Whether no motor is registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.motors.is_empty()
    }

    /// Whether a motor is registered under `id`.
    pub fn contains(&self, id: MotorId) -> bool {
        self.motors.iter().any(|m| m.id() == id)
    }

    /// Id of the motor on a clock hand.
    ///
    /// # Errors
    ///
    /// Returns range errors for indices outside the layout and
    /// `MotorError::UnknownMotor` if no motor sits on that hand.
    pub fn id(&self, clock: u8, hand: u8) -> Result<MotorId> {
        let id = self.layout.id(clock, hand)?;
        if !self.contains(id) {
            return Err(MotorError::UnknownMotor(id).into());
        }
        Ok(id)
    }

    /// Ids of all registered motors, in registration order.
    pub fn ids(&self) -> impl Iterator<Item = MotorId> + '_ {
        self.motors.iter().map(|m| m.id())
    }

    /// Ids of all motors with a home sensor.
    pub fn sensor_ids(&self) -> MotorSet {
        self.motors
            .iter()
            .filter(|m| m.has_sensor())
            .map(|m| m.id())
            .collect()
    }

    /// Ids of the registered motors of one clock.
    ///
    /// # Errors
    ///
    /// Returns `MotorError::ClockOutOfRange` for an unknown clock.
    pub fn clock_ids(&self, clock: u8) -> Result<MotorSet> {
        Ok(self
            .layout
            .clock_ids(clock)?
            .filter(|id| self.contains(*id))
            .collect())
    }

    /// Get a motor.
    ///
    /// # Errors
    ///
    /// Returns `MotorError::UnknownMotor` if nothing is registered as `id`.
    pub fn motor(&self, id: MotorId) -> Result<&Motor<D, S>> {
        self.motors
            .iter()
            .find(|m| m.id() == id)
            .ok_or_else(|| MotorError::UnknownMotor(id).into())
    }

    /// Get a motor mutably.
    ///
    /// # Errors
    ///
    /// Returns `MotorError::UnknownMotor` if nothing is registered as `id`.
    pub fn motor_mut(&mut self, id: MotorId) -> Result<&mut Motor<D, S>> {
        self.motors
            .iter_mut()
            .find(|m| m.id() == id)
            .ok_or_else(|| MotorError::UnknownMotor(id).into())
    }

    /// Iterate over all motors.
    pub fn motors(&self) -> impl Iterator<Item = &Motor<D, S>> {
        self.motors.iter()
    }

    /// Advance every motor by one tick.
    ///
    /// Called from the periodic timer interrupt.
    pub fn tick(&mut self) -> TickStatus {
        self.motors
            .iter_mut()
            .fold(TickStatus::Idle, |status, m| status.merge(m.tick()))
    }

    /// Start a move on one motor.
    ///
    /// # Errors
    ///
    /// Returns `MotorError::UnknownMotor` for an unregistered id.
    pub fn arm(&mut self, id: MotorId, command: MoveCommand) -> Result<()> {
        self.motor_mut(id)?.arm(command);
        Ok(())
    }

    /// Move a hand to an absolute angle.
    ///
    /// Returns the planned step count.
    ///
    /// # Errors
    ///
    /// Returns `MotorError::UnknownMotor` or `MotionError::InvalidAngle`;
    /// the motor is left untouched on error.
    pub fn move_to_angle(
        &mut self,
        id: MotorId,
        target: Degrees,
        mode: MoveMode,
        step_period: u16,
        ramp: Ramp,
    ) -> Result<i32> {
        let motor = self.motor_mut(id)?;
        let steps = motor.position().steps_to(target, mode)?;
        motor.arm(MoveCommand::new(steps, step_period).with_ramp(ramp));
        Ok(steps)
    }

    /// Move a hand by a relative angle with ramp shaping.
    ///
    /// Returns the step count.
    ///
    /// # Errors
    ///
    /// Returns `MotorError::UnknownMotor`, `MotionError::InvalidAngle` or
    /// `MotionError::Overflow`.
    pub fn move_by_degrees(
        &mut self,
        id: MotorId,
        degrees: Degrees,
        step_period: u16,
        ramp: Ramp,
    ) -> Result<i32> {
        let steps = relative_steps(degrees, self.steps_per_revolution)?;
        self.arm(id, MoveCommand::new(steps, step_period).with_ramp(ramp))?;
        Ok(steps)
    }

    /// Move a hand by a relative angle at constant speed.
    ///
    /// # Errors
    ///
    /// See [`move_by_degrees`](Self::move_by_degrees).
    pub fn issue_relative_move(&mut self, id: MotorId, degrees: Degrees, step_period: u16) -> Result<i32> {
        self.move_by_degrees(id, degrees, step_period, Ramp::NONE)
    }

    /// Move a hand by a number of steps at constant speed.
    ///
    /// # Errors
    ///
    /// Returns `MotorError::UnknownMotor` for an unregistered id.
    pub fn move_steps(&mut self, id: MotorId, steps: i32, step_period: u16) -> Result<()> {
        self.arm(id, MoveCommand::new(steps, step_period))
    }

    /// Whether a motor has finished its move.
    ///
    /// # Errors
    ///
    /// Returns `MotorError::UnknownMotor` for an unregistered id.
    pub fn is_idle(&self, id: MotorId) -> Result<bool> {
        Ok(self.motor(id)?.is_idle())
    }

    /// Whether every listed motor has finished its move.
    ///
    /// Unknown ids count as idle.
    pub fn all_idle(&self, ids: &[MotorId]) -> bool {
        self.motors
            .iter()
            .filter(|m| ids.contains(&m.id()))
            .all(|m| m.is_idle())
    }

    /// Whether the whole array has finished moving.
    pub fn everything_idle(&self) -> bool {
        self.motors.iter().all(|m| m.is_idle())
    }

    /// Abort the move of one motor.
    ///
    /// # Errors
    ///
    /// Returns `MotorError::UnknownMotor` for an unregistered id.
    pub fn set_idle(&mut self, id: MotorId) -> Result<()> {
        self.motor_mut(id)?.set_idle();
        Ok(())
    }

    /// Abort every move.
    pub fn stop_all(&mut self) {
        for motor in self.motors.iter_mut() {
            motor.set_idle();
        }
    }

    /// Raw position in steps.
    ///
    /// # Errors
    ///
    /// Returns `MotorError::UnknownMotor` for an unregistered id.
    pub fn position(&self, id: MotorId) -> Result<i32> {
        Ok(self.motor(id)?.position().steps())
    }

    /// Position within one revolution.
    ///
    /// # Errors
    ///
    /// Returns `MotorError::UnknownMotor` for an unregistered id.
    pub fn normalized_position(&self, id: MotorId) -> Result<i32> {
        Ok(self.motor(id)?.position().normalized())
    }

    /// Hand angle in `[0, 360)`.
    ///
    /// # Errors
    ///
    /// Returns `MotorError::UnknownMotor` for an unregistered id.
    pub fn angle(&self, id: MotorId) -> Result<Degrees> {
        Ok(self.motor(id)?.position().degrees())
    }

    /// Fold the stored position onto one revolution.
    ///
    /// # Errors
    ///
    /// Returns `MotorError::UnknownMotor` for an unregistered id.
    pub fn normalize_position(&mut self, id: MotorId) -> Result<()> {
        self.motor_mut(id)?.normalize_position();
        Ok(())
    }

    /// Fold every stored position onto one revolution.
    pub fn normalize_all(&mut self) {
        for motor in self.motors.iter_mut() {
            motor.normalize_position();
        }
    }

    /// Overwrite a position.
    ///
    /// # Errors
    ///
    /// Returns `MotorError::UnknownMotor` for an unregistered id.
    pub fn set_position(&mut self, id: MotorId, steps: i32) -> Result<()> {
        self.motor_mut(id)?.set_position(steps);
        Ok(())
    }

    /// Declare the current position of the listed motors as twelve o'clock.
    pub fn set_zero(&mut self, ids: &[MotorId]) {
        for motor in self.motors.iter_mut().filter(|m| ids.contains(&m.id())) {
            motor.set_position(0);
        }
    }

    /// Read a home sensor.
    ///
    /// # Errors
    ///
    /// Returns `MotorError::UnknownMotor` for an unregistered id and
    /// `MotorError::NoSensor` if the hand has no sensor.
    pub fn sensor_triggered(&mut self, id: MotorId) -> Result<bool> {
        self.motor_mut(id)?
            .sensor_triggered()
            .ok_or_else(|| MotorError::NoSensor(id).into())
    }

    /// Diagnostics snapshot of one motor.
    ///
    /// # Errors
    ///
    /// Returns `MotorError::UnknownMotor` for an unregistered id.
    pub fn status(&self, id: MotorId) -> Result<MotorStatus> {
        Ok(self.motor(id)?.status())
    }

    /// Reset every backend.
    pub fn reset_backends(&mut self) {
        for motor in self.motors.iter_mut() {
            motor.reset();
        }
    }
}
