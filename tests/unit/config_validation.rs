//! Unit tests for configuration validation.

use stepper_clock::config::{validate_config, SystemConfig};
use stepper_clock::error::{ConfigError, Error};

fn parse(toml_str: &str) -> SystemConfig {
    toml::from_str(toml_str).expect("Failed to parse TOML")
}

/// Test validation of a valid configuration.
#[test]
fn test_valid_config_passes_validation() {
    let config = parse(
        r#"
[clock]
clocks = 1
hands_per_clock = 2

[motors.hour]
clock = 0
hand = 0

[motors.minute]
clock = 0
hand = 1
"#,
    );

    assert!(validate_config(&config).is_ok());
}

/// Test validation fails for a single-step revolution.
#[test]
fn test_steps_per_revolution_too_small() {
    let config = parse("[clock]\nsteps_per_revolution = 1\n");

    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidStepsPerRevolution(1)))
    ));
}

/// Test validation fails for a zero tick period.
#[test]
fn test_zero_tick_period() {
    let config = parse("[clock]\ntick_period_us = 0\n");

    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidTickPeriod(0)))
    ));
}

/// Test validation fails for an empty layout.
#[test]
fn test_empty_layout() {
    let config = parse("[clock]\nclocks = 0\n");

    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidLayout { clocks: 0, .. }))
    ));
}

/// Test validation fails for a motor on a hand the clock does not have.
#[test]
fn test_motor_hand_outside_layout() {
    let config = parse(
        r#"
[clock]
hands_per_clock = 2

[motors.seconds]
clock = 0
hand = 2
"#,
    );

    match validate_config(&config) {
        Err(Error::Config(ConfigError::MotorOutsideLayout { motor, clock, hand })) => {
            assert_eq!(motor.as_str(), "seconds");
            assert_eq!(clock, 0);
            assert_eq!(hand, 2);
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

/// Test validation fails for two motors on one hand.
#[test]
fn test_duplicate_hand() {
    let config = parse(
        r#"
[motors.a]
clock = 2
hand = 0

[motors.b]
clock = 2
hand = 0
"#,
    );

    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::DuplicateHand { clock: 2, hand: 0 }))
    ));
}

/// Test validation fails for a homing phase that never waits.
#[test]
fn test_zero_poll_interval() {
    let config = parse(
        r#"
[homing]
coarse_seek = { step = 10, poll_ms = 0, timeout_ms = 10000 }
"#,
    );

    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidHomingPhase("coarse_seek")))
    ));
}

/// Test validation fails for a coarse seek running away from the sensor edge.
#[test]
fn test_coarse_seek_against_reseek() {
    let config = parse(
        r#"
[homing]
coarse_seek = { step = -10, poll_ms = 10, timeout_ms = 10000 }
"#,
    );

    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidHomingPhase("coarse_seek")))
    ));
}

/// Test that error messages name the problem.
#[test]
fn test_error_display() {
    let config = parse("[clock]\ntick_period_us = 0\n");
    let err = validate_config(&config).unwrap_err();

    assert_eq!(
        err.to_string(),
        "Configuration error: Invalid tick period: 0 us. Must be > 0"
    );
}
