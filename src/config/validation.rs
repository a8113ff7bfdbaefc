//! Configuration validation.

use crate::error::{ConfigError, Error, Result};
use crate::motor::MAX_MOTORS;

use super::{PhaseTiming, SystemConfig};

/// Validate a system configuration.
///
/// Checks:
/// - Steps per revolution and tick period are usable
/// - The clock layout is non-empty and fits the registry
/// - Every motor sits inside the layout, one motor per hand
/// - Homing phases have non-zero steps and poll intervals
/// - Each homing flow seeks and re-seeks the same way and backs off the other way
pub fn validate_config(config: &SystemConfig) -> Result<()> {
    validate_clock(config)?;

    // Validate motors
    for (name, motor) in config.motors.iter() {
        validate_motor(name.as_str(), motor, config)?;
    }

    validate_homing(config)?;

    Ok(())
}

fn validate_clock(config: &SystemConfig) -> Result<()> {
    let clock = &config.clock;

    // A circle needs at least two positions
    if clock.steps_per_revolution < 2 || clock.steps_per_revolution > i32::MAX as u32 {
        return Err(Error::Config(ConfigError::InvalidStepsPerRevolution(
            clock.steps_per_revolution,
        )));
    }

    if clock.tick_period_us == 0 {
        return Err(Error::Config(ConfigError::InvalidTickPeriod(clock.tick_period_us)));
    }

    let count = clock.clocks as usize * clock.hands_per_clock as usize;
    if count == 0 || count > MAX_MOTORS {
        return Err(Error::Config(ConfigError::InvalidLayout {
            clocks: clock.clocks,
            hands_per_clock: clock.hands_per_clock,
        }));
    }

    Ok(())
}

fn validate_motor(name: &str, motor: &super::MotorConfig, config: &SystemConfig) -> Result<()> {
    if config.clock.layout().id(motor.clock, motor.hand).is_err() {
        return Err(Error::Config(ConfigError::MotorOutsideLayout {
            motor: heapless::String::try_from(name).unwrap_or_default(),
            clock: motor.clock,
            hand: motor.hand,
        }));
    }

    // One motor per clock hand
    let on_same_hand = config
        .motors
        .values()
        .filter(|m| m.clock == motor.clock && m.hand == motor.hand)
        .count();
    if on_same_hand > 1 {
        return Err(Error::Config(ConfigError::DuplicateHand {
            clock: motor.clock,
            hand: motor.hand,
        }));
    }

    Ok(())
}

fn validate_homing(config: &SystemConfig) -> Result<()> {
    for (name, phase) in config.homing.phases() {
        if !phase.is_valid() {
            return Err(Error::Config(ConfigError::InvalidHomingPhase(name)));
        }
    }

    let homing = &config.homing;
    validate_approach(
        ("coarse_seek", &homing.coarse_seek),
        ("fine_backoff", &homing.fine_backoff),
        &homing.fine_reseek,
    )?;
    validate_approach(
        ("reference_seek", &homing.reference_seek),
        ("reference_backoff", &homing.reference_backoff),
        &homing.reference_reseek,
    )
}

/// The re-seek direction fixes which side of the sensor edge is approached.
fn validate_approach(
    seek: (&'static str, &PhaseTiming),
    backoff: (&'static str, &PhaseTiming),
    reseek: &PhaseTiming,
) -> Result<()> {
    let toward = reseek.step.signum();
    if seek.1.step.signum() != toward {
        return Err(Error::Config(ConfigError::InvalidHomingPhase(seek.0)));
    }
    if backoff.1.step.signum() == toward {
        return Err(Error::Config(ConfigError::InvalidHomingPhase(backoff.0)));
    }
    Ok(())
}
