//! Sensor-guided zero calibration of clock hands.

use embedded_hal::delay::DelayNs;

use crate::config::units::Degrees;
use crate::config::{HomingConfig, PhaseTiming};
use crate::error::{CalibrationError, HomingPhase, MotionError, MotorError, Result};
use crate::motor::{collect_set, HomeSensor, MotorId, StepperBackend, MAX_MOTORS};
use crate::sequencer::Sequencer;

use super::convergence::{converge_sensor, SensorTarget};
use super::store::OffsetStore;

/// Offsets written by a derive-and-commit run.
pub type OffsetTable = heapless::Vec<(MotorId, i16), MAX_MOTORS>;

/// Zero calibration driver.
///
/// Owns the foreground sequencer and the offset store for the duration of
/// calibration; [`release`](Self::release) hands both back.
pub struct ZeroCalibrator<'a, D, S, DELAY, ST>
where
    D: StepperBackend,
    S: HomeSensor,
    DELAY: DelayNs,
    ST: OffsetStore,
{
    seq: Sequencer<'a, D, S, DELAY>,
    store: ST,
    config: HomingConfig,
}

impl<'a, D, S, DELAY, ST> ZeroCalibrator<'a, D, S, DELAY, ST>
where
    D: StepperBackend,
    S: HomeSensor,
    DELAY: DelayNs,
    ST: OffsetStore,
{
    /// Create a calibrator.
    pub fn new(seq: Sequencer<'a, D, S, DELAY>, store: ST, config: HomingConfig) -> Self {
        Self { seq, store, config }
    }

    /// The offset store.
    #[inline]
    pub fn store(&self) -> &ST {
        &self.store
    }

    /// The offset store, mutably.
    #[inline]
    pub fn store_mut(&mut self) -> &mut ST {
        &mut self.store
    }

    /// The sequencer.
    #[inline]
    pub fn sequencer(&mut self) -> &mut Sequencer<'a, D, S, DELAY> {
        &mut self.seq
    }

    /// Homing parameters.
    #[inline]
    pub fn config(&self) -> &HomingConfig {
        &self.config
    }

    /// Hand back sequencer and store.
    pub fn release(self) -> (Sequencer<'a, D, S, DELAY>, ST) {
        (self.seq, self.store)
    }

    /// Calibrate every motor that has a home sensor.
    ///
    /// # Errors
    ///
    /// See [`calibrate_set`](Self::calibrate_set).
    pub fn calibrate_all(&mut self) -> Result<()> {
        let motors = self.seq.registry().with(|registry| registry.sensor_ids());
        self.calibrate_set(&motors)
    }

    /// Calibrate a single clock hand.
    ///
    /// # Errors
    ///
    /// Returns range errors for an unknown clock hand, otherwise see
    /// [`calibrate_set`](Self::calibrate_set).
    pub fn calibrate_hand(&mut self, clock: u8, hand: u8) -> Result<()> {
        let id = self.seq.registry().with(|registry| registry.id(clock, hand))?;
        self.calibrate_set(&[id])
    }

    /// Bring a set of hands to their zero position.
    ///
    /// Hands already over the sensor are first moved clear of it. All hands
    /// then seek the sensor in coarse steps, back off until it releases and
    /// creep forward onto its edge again. The stored offset is applied and
    /// the resulting position becomes 0.
    ///
    /// # Errors
    ///
    /// Invalid sets (empty, longer than `MAX_MOTORS`, a repeated motor, an
    /// unknown motor, a motor without sensor) are rejected before anything
    /// moves. A phase that does not converge in
    /// time aborts the attempt with `CalibrationError::Timeout`; steps
    /// already issued are not undone.
    pub fn calibrate_set(&mut self, motors: &[MotorId]) -> Result<()> {
        self.check_set(motors)?;
        log_info!("calibrating {} motor(s)", motors.len());

        self.escape(motors)?;
        let coarse = self.config.coarse_seek;
        let backoff = self.config.fine_backoff;
        let reseek = self.config.fine_reseek;
        self.seek(motors, HomingPhase::CoarseSeek, SensorTarget::Triggered, &coarse)?;
        self.seek(motors, HomingPhase::FineBackoff, SensorTarget::Released, &backoff)?;
        self.seek(motors, HomingPhase::FineReseek, SensorTarget::Triggered, &reseek)?;

        let offsets: OffsetTable = motors.iter().map(|id| (*id, self.store.offset(*id))).collect();
        self.apply_offsets(motors, &offsets)?;
        self.seq.registry().with(|registry| registry.set_zero(motors));

        log_info!("calibration done");
        Ok(())
    }

    /// Measure new offsets with every hand set to twelve o'clock by hand.
    ///
    /// The current positions become 0, the hands converge onto their sensor
    /// edge from the other side, and the negated step counts are stored as
    /// the new offsets. The hands are then moved back by those offsets.
    ///
    /// The hands approach the sensor backwards here, so they settle on the
    /// far edge of the sensor window, while
    /// [`calibrate_set`](Self::calibrate_set) settles on the near edge. A
    /// later calibration with these offsets therefore stops about one sensor
    /// window width short of twelve o'clock.
    ///
    /// # Errors
    ///
    /// Same input checks as [`calibrate_set`](Self::calibrate_set). A phase
    /// timeout aborts before anything is stored. A measured position that
    /// does not fit an `i16` offset aborts with `MotionError::Overflow`
    /// before anything is stored. A rejected store write aborts with
    /// `CalibrationError::Persistence` and leaves the stored offsets and
    /// hand positions as they were.
    pub fn derive_and_commit_offsets(&mut self, motors: &[MotorId]) -> Result<OffsetTable> {
        self.check_set(motors)?;
        log_info!("deriving offsets for {} motor(s)", motors.len());

        self.seq.registry().with(|registry| registry.set_zero(motors));

        let seek = self.config.reference_seek;
        let backoff = self.config.reference_backoff;
        let reseek = self.config.reference_reseek;
        self.seek(motors, HomingPhase::CoarseSeek, SensorTarget::Triggered, &seek)?;
        self.seek(motors, HomingPhase::FineBackoff, SensorTarget::Released, &backoff)?;
        self.seek(motors, HomingPhase::FineReseek, SensorTarget::Triggered, &reseek)?;

        let offsets: OffsetTable = self.seq.registry().with(|registry| {
            motors
                .iter()
                .map(|id| Ok((*id, to_offset(registry.position(*id)?)?)))
                .collect::<Result<OffsetTable>>()
        })?;

        if let Err(e) = self.store.set_offsets(&offsets) {
            log_warn!("offset commit failed: {}", e);
            return Err(CalibrationError::Persistence(e).into());
        }
        log_info!("committed {} offset(s)", offsets.len());

        let committed: OffsetTable = offsets.iter().map(|(id, _)| (*id, self.store.offset(*id))).collect();
        self.apply_offsets(motors, &committed)?;
        Ok(offsets)
    }

    /// Store the offset of a single clock hand.
    ///
    /// # Errors
    ///
    /// Returns range errors for an unknown clock hand and
    /// `CalibrationError::Persistence` if the store rejects the write.
    pub fn set_offset(&mut self, clock: u8, hand: u8, offset: i16) -> Result<()> {
        let id = self.seq.registry().with(|registry| registry.id(clock, hand))?;
        self.store.set_offset(id, offset)?;
        Ok(())
    }

    fn check_set(&self, motors: &[MotorId]) -> Result<()> {
        if motors.is_empty() {
            return Err(CalibrationError::EmptySet.into());
        }
        if motors.len() > MAX_MOTORS {
            return Err(CalibrationError::SetTooLarge(motors.len()).into());
        }
        self.seq.registry().with(|registry| {
            motors.iter().enumerate().try_for_each(|(index, id)| {
                if motors[..index].contains(id) {
                    return Err(MotorError::DuplicateMotor(*id).into());
                }
                if registry.motor(*id)?.has_sensor() {
                    Ok(())
                } else {
                    Err(MotorError::NoSensor(*id).into())
                }
            })
        })
    }

    fn escape(&mut self, motors: &[MotorId]) -> Result<()> {
        let on_sensor = self.seq.registry().sensor_mismatch(motors, false);
        if on_sensor.is_empty() {
            return Ok(());
        }
        log_debug!("{} motor(s) start on the sensor", on_sensor.len());

        let degrees = Degrees(self.config.escape_degrees);
        let step_period = self.config.step_period;
        self.seq.registry().with(|registry| {
            on_sensor
                .iter()
                .try_for_each(|id| registry.issue_relative_move(*id, degrees, step_period).map(|_| ()))
        })?;
        self.settle(motors, HomingPhase::Escape)
    }

    fn seek(&mut self, motors: &[MotorId], phase: HomingPhase, target: SensorTarget, timing: &PhaseTiming) -> Result<()> {
        log_debug!("{} started", phase);
        match converge_sensor(&mut self.seq, motors, target, timing, self.config.step_period) {
            Ok(elapsed) => {
                log_debug!("{} converged after {} ms", phase, elapsed);
                Ok(())
            }
            Err(pending) => {
                log_warn!("{} timed out, {} motor(s) pending", phase, pending.len());
                Err(CalibrationError::Timeout { phase, pending }.into())
            }
        }
    }

    fn apply_offsets(&mut self, motors: &[MotorId], offsets: &[(MotorId, i16)]) -> Result<()> {
        let step_period = self.config.step_period;
        self.seq.registry().with(|registry| {
            offsets
                .iter()
                .try_for_each(|(id, offset)| registry.move_steps(*id, *offset as i32, step_period))
        })?;
        self.settle(motors, HomingPhase::ApplyOffset)
    }

    fn settle(&mut self, motors: &[MotorId], phase: HomingPhase) -> Result<()> {
        let poll_ms = self.config.settle_ms;
        let limit_ms = self.config.move_timeout_ms;
        if self.seq.wait_idle(motors, poll_ms, limit_ms).is_ok() {
            return Ok(());
        }
        let pending = self.seq.registry().with(|registry| {
            collect_set(
                motors
                    .iter()
                    .copied()
                    .filter(|id| !registry.is_idle(*id).unwrap_or(true)),
            )
        });
        log_warn!("{} timed out, {} motor(s) still moving", phase, pending.len());
        Err(CalibrationError::Timeout { phase, pending }.into())
    }
}

/// Offset that undoes a measured position.
fn to_offset(position: i32) -> Result<i16> {
    position
        .checked_neg()
        .and_then(|offset| i16::try_from(offset).ok())
        .ok_or_else(|| MotionError::Overflow.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_offset() {
        assert_eq!(to_offset(25).unwrap(), -25);
        assert_eq!(to_offset(-7).unwrap(), 7);
        assert_eq!(to_offset(-(i16::MAX as i32)).unwrap(), i16::MAX);
        assert!(matches!(to_offset(100_000), Err(crate::Error::Motion(MotionError::Overflow))));
        assert!(to_offset(i32::MIN).is_err());
    }
}
