//! Registry shared between the tick interrupt and foreground code.
//!
//! Every access runs inside a `critical_section`, so a move written by
//! foreground code is never observed half-updated by the tick handler.
//!
//! ```rust,ignore
//! static CLOCK: SharedRegistry<Backend, Sensor> =
//!     SharedRegistry::new(MotorRegistry::new(ClockLayout::new(4, 2), 4320));
//!
//! #[interrupt]
//! fn TIMER0() {
//!     CLOCK.tick();
//! }
//! ```

use core::cell::RefCell;

use critical_section::Mutex;

use crate::error::Result;
use crate::motion::MoveCommand;

use super::backend::{HomeSensor, NoSensor, StepperBackend};
use super::id::MotorId;
use super::state::TickStatus;
use super::system::{collect_set, MotorRegistry, MotorSet};

/// A [`MotorRegistry`] behind a critical-section mutex.
pub struct SharedRegistry<D, S = NoSensor>
where
    D: StepperBackend,
    S: HomeSensor,
{
    inner: Mutex<RefCell<MotorRegistry<D, S>>>,
}

impl<D, S> SharedRegistry<D, S>
where
    D: StepperBackend,
    S: HomeSensor,
{
    /// Wrap a registry.
    pub const fn new(registry: MotorRegistry<D, S>) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(registry)),
        }
    }

    /// Advance every motor by one tick. Call from the timer interrupt.
    pub fn tick(&self) -> TickStatus {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).tick())
    }

    /// Run `f` with exclusive access to the registry.
    ///
    /// Keep `f` short: ticks are held off while it runs.
    pub fn with<R>(&self, f: impl FnOnce(&mut MotorRegistry<D, S>) -> R) -> R {
        critical_section::with(|cs| f(&mut self.inner.borrow_ref_mut(cs)))
    }

    /// Start a move on one motor.
    ///
    /// # Errors
    ///
    /// Returns `MotorError::UnknownMotor` for an unregistered id.
    pub fn arm(&self, id: MotorId, command: MoveCommand) -> Result<()> {
        self.with(|registry| registry.arm(id, command))
    }

    /// Whether every listed motor has finished its move.
    pub fn all_idle(&self, ids: &[MotorId]) -> bool {
        self.with(|registry| registry.all_idle(ids))
    }

    /// Listed motors whose sensor state differs from `on_sensor`.
    ///
    /// Motors without a sensor are never pending. Repeated ids are
    /// reported once.
    pub fn sensor_mismatch(&self, ids: &[MotorId], on_sensor: bool) -> MotorSet {
        self.with(|registry| {
            collect_set(
                ids.iter()
                    .copied()
                    .filter(|id| matches!(registry.sensor_triggered(*id), Ok(state) if state != on_sensor)),
            )
        })
    }

    /// Unwrap the registry.
    pub fn into_inner(self) -> MotorRegistry<D, S> {
        self.inner.into_inner().into_inner()
    }
}
