//! Generic "drive a motor set until every motor satisfies X" loop.

use embedded_hal::delay::DelayNs;

use crate::config::PhaseTiming;
use crate::motor::{collect_set, HomeSensor, MotorId, MotorRegistry, MotorSet, StepperBackend};
use crate::sequencer::Sequencer;

/// Sensor state a convergence phase drives towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorTarget {
    /// Hand over the sensor.
    Triggered,
    /// Hand away from the sensor.
    Released,
}

impl SensorTarget {
    /// Sensor reading that satisfies this target.
    #[inline]
    pub const fn reading(self) -> bool {
        matches!(self, SensorTarget::Triggered)
    }
}

/// Repeat `act` on every motor for which `pending` holds, waiting
/// `poll_ms` after each round, until no motor is pending.
///
/// The time spent waiting counts against `timeout_ms`; once it is used up
/// the still-pending motors are returned as `Err`. On success returns the
/// elapsed time.
///
/// A motor listed more than once is acted on once per round.
pub fn converge<D, S, DELAY, P, A>(
    seq: &mut Sequencer<'_, D, S, DELAY>,
    motors: &[MotorId],
    mut pending: P,
    mut act: A,
    poll_ms: u32,
    timeout_ms: u32,
) -> Result<u32, MotorSet>
where
    D: StepperBackend,
    S: HomeSensor,
    DELAY: DelayNs,
    P: FnMut(&mut MotorRegistry<D, S>, MotorId) -> bool,
    A: FnMut(&mut MotorRegistry<D, S>, MotorId),
{
    let mut elapsed = 0u32;
    loop {
        let waiting = seq
            .registry()
            .with(|registry| collect_set(motors.iter().copied().filter(|id| pending(registry, *id))));
        if waiting.is_empty() {
            return Ok(elapsed);
        }
        if elapsed > timeout_ms {
            return Err(waiting);
        }

        seq.registry().with(|registry| {
            for id in waiting.iter() {
                act(registry, *id);
            }
        });

        let budget = timeout_ms.saturating_sub(elapsed).max(poll_ms);
        let waited = seq.wait_idle(&waiting, poll_ms, budget).unwrap_or_else(|e| e);
        elapsed = elapsed.saturating_add(waited);
    }
}

/// Step every motor whose sensor does not read `target` by `timing.step`
/// until all of them do.
///
/// Motors without a sensor are never pending.
pub fn converge_sensor<D, S, DELAY>(
    seq: &mut Sequencer<'_, D, S, DELAY>,
    motors: &[MotorId],
    target: SensorTarget,
    timing: &PhaseTiming,
    step_period: u16,
) -> Result<u32, MotorSet>
where
    D: StepperBackend,
    S: HomeSensor,
    DELAY: DelayNs,
{
    let step = timing.step;
    converge(
        seq,
        motors,
        |registry, id| matches!(registry.sensor_triggered(id), Ok(on) if on != target.reading()),
        |registry, id| {
            // ids come from the registry's own pending check
            let _ = registry.move_steps(id, step, step_period);
        },
        timing.poll_ms,
        timing.timeout_ms,
    )
}
