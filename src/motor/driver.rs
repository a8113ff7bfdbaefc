//! Motor record and the per-motor tick state machine.
//!
//! One `Motor` per clock hand. `tick` runs from the periodic timer interrupt;
//! everything else is called from foreground code.

use crate::motion::{advance_ramp_down, advance_ramp_up, ramp_delay_increment};
use crate::motion::{Direction, MoveCommand, Ramp, RAMP_HORIZON};

use super::backend::{HomeSensor, NoSensor, StepperBackend};
use super::id::MotorId;
use super::position::Position;
use super::state::{MotorStatus, TickStatus};

/// A clock hand motor.
///
/// Generic over:
/// - `D`: stepping backend (must implement `StepperBackend`)
/// - `S`: home sensor (must implement `HomeSensor`, defaults to `NoSensor`)
pub struct Motor<D, S = NoSensor>
where
    D: StepperBackend,
    S: HomeSensor,
{
    /// Registry slot.
    id: MotorId,

    /// Motor name for logging/debugging.
    name: heapless::String<32>,

    /// Device that performs the steps.
    backend: D,

    /// Home sensor, if this hand has one.
    sensor: Option<S>,

    /// Current position.
    position: Position,

    /// Signed steps left in the current move.
    steps_remaining: i32,

    /// Step period requested by the current move, in ticks.
    base_period: u16,

    /// Effective step period: base period plus the ramp increment.
    step_period: u16,

    /// Ticks left until the next step may be issued.
    period_counter: u16,

    /// Progress through the acceleration ramp.
    ramp_counter: i32,

    /// Ramp shaping of the current move.
    ramp: Ramp,
}

impl<D, S> Motor<D, S>
where
    D: StepperBackend,
    S: HomeSensor,
{
    /// Create an idle motor.
    pub(crate) fn new(
        id: MotorId,
        name: heapless::String<32>,
        backend: D,
        sensor: Option<S>,
        position: Position,
    ) -> Self {
        Self {
            id,
            name,
            backend,
            sensor,
            position,
            steps_remaining: 0,
            base_period: 0,
            step_period: 0,
            period_counter: 0,
            ramp_counter: 0,
            ramp: Ramp::NONE,
        }
    }

    /// Advance the motor by one tick.
    ///
    /// Issues at most one step. Never blocks and never fails.
    pub fn tick(&mut self) -> TickStatus {
        if self.period_counter > 0 {
            self.period_counter -= 1;
            return if self.steps_remaining != 0 {
                TickStatus::Busy
            } else {
                TickStatus::Idle
            };
        }

        if self.steps_remaining == 0 {
            return TickStatus::Idle;
        }

        let direction = Direction::from_steps(self.steps_remaining);
        self.backend.step(direction);
        self.position.move_steps(direction.sign());
        self.steps_remaining -= direction.sign();

        let to_go = self.steps_remaining.saturating_abs();
        let mut increment = 0;
        if self.ramp.up && to_go > RAMP_HORIZON {
            self.ramp_counter = advance_ramp_up(self.ramp_counter);
            increment = ramp_delay_increment(self.ramp_counter);
        } else if self.ramp.down && to_go < RAMP_HORIZON {
            self.ramp_counter = advance_ramp_down(self.ramp_counter);
            increment = ramp_delay_increment(self.ramp_counter);
        }

        self.step_period = self.base_period.saturating_add(increment);
        self.period_counter = self.step_period;
        TickStatus::Busy
    }

    /// Start a move, replacing whatever move was in progress.
    ///
    /// The position is kept; the running period is shortened if the new
    /// step period is shorter.
    pub fn arm(&mut self, command: MoveCommand) {
        self.steps_remaining = command.steps;
        self.base_period = command.step_period;
        self.step_period = command.step_period;
        self.ramp = command.ramp;
        self.ramp_counter = 0;
        self.period_counter = self.period_counter.min(self.step_period);
    }

    /// Drop the remaining steps of the current move.
    #[inline]
    pub fn set_idle(&mut self) {
        self.steps_remaining = 0;
    }

    /// Whether the current move has finished.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.steps_remaining == 0
    }

    /// Registry slot.
    #[inline]
    pub fn id(&self) -> MotorId {
        self.id
    }

    /// Get the motor name.
    #[inline]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Current position.
    #[inline]
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Overwrite the position, also in the backend's own counter.
    pub fn set_position(&mut self, steps: i32) {
        self.position.set(steps);
        self.backend.set_raw_position(steps);
    }

    /// Reduce the position to one revolution.
    pub fn normalize_position(&mut self) {
        self.position.normalize();
        self.backend.set_raw_position(self.position.steps());
    }

    /// Signed steps left in the current move.
    #[inline]
    pub fn steps_remaining(&self) -> i32 {
        self.steps_remaining
    }

    /// Effective step period in ticks.
    #[inline]
    pub fn step_period(&self) -> u16 {
        self.step_period
    }

    /// Ticks until the next step.
    #[inline]
    pub fn period_counter(&self) -> u16 {
        self.period_counter
    }

    /// Ramp shaping of the current move.
    #[inline]
    pub fn ramp(&self) -> Ramp {
        self.ramp
    }

    /// Whether a home sensor is fitted.
    #[inline]
    pub fn has_sensor(&self) -> bool {
        self.sensor.is_some()
    }

    /// Read the home sensor. `None` without a sensor.
    pub fn sensor_triggered(&mut self) -> Option<bool> {
        self.sensor.as_mut().map(|s| s.is_triggered())
    }

    /// Reset the backend hardware.
    pub fn reset(&mut self) {
        self.backend.reset();
    }

    /// Access the backend.
    #[inline]
    pub fn backend(&self) -> &D {
        &self.backend
    }

    /// Mutable access to the backend.
    #[inline]
    pub fn backend_mut(&mut self) -> &mut D {
        &mut self.backend
    }

    /// Diagnostics snapshot.
    pub fn status(&self) -> MotorStatus {
        MotorStatus {
            position: self.position.steps(),
            step_period: self.step_period,
            steps_remaining: self.steps_remaining,
            ramp_counter: self.ramp_counter,
        }
    }
}
