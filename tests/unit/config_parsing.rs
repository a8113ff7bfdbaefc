//! Unit tests for TOML configuration parsing.

use stepper_clock::config::{parse_config, Degrees, SystemConfig};
use stepper_clock::motor::MotorId;

/// Test parsing a complete clock configuration from TOML.
#[test]
fn test_parse_clock_config() {
    let toml_str = r#"
[clock]
steps_per_revolution = 4320
tick_period_us = 250
clocks = 2
hands_per_clock = 2

[motors.c0_inner]
clock = 0
hand = 0
zero_offset = 35

[motors.c0_outer]
clock = 0
hand = 1
invert_direction = true
"#;

    let config: SystemConfig = toml::from_str(toml_str).expect("Failed to parse TOML");

    assert_eq!(config.clock.steps_per_revolution, 4320);
    assert_eq!(config.clock.tick_period_us, 250);
    assert_eq!(config.clock.ticks_per_ms(), 4);
    assert_eq!(config.clock.layout().motor_count(), 4);

    let inner = config.motor("c0_inner").expect("Motor not found");
    assert_eq!(inner.zero_offset, 35);
    assert!(inner.has_sensor);
    assert!(!inner.invert_direction);

    let outer = config.motor("c0_outer").expect("Motor not found");
    assert!(outer.invert_direction);
    assert_eq!(config.motor_id("c0_outer"), Some(MotorId(1)));
}

/// Test that omitted tables fall back to the reference clock.
#[test]
fn test_defaults_without_tables() {
    let config: SystemConfig = toml::from_str("").expect("Failed to parse TOML");

    assert_eq!(config.clock.steps_per_revolution, 4320);
    assert_eq!(config.clock.tick_period_us, 200);
    assert_eq!(config.clock.clocks, 4);
    assert_eq!(config.clock.hands_per_clock, 2);
    assert_eq!(config.homing.step_period, 6);
    assert_eq!(config.homing.escape_degrees, 90.0);
    assert_eq!(config.homing.coarse_seek.step, 10);
    assert_eq!(config.homing.fine_backoff.step, -1);
    assert_eq!(config.homing.reference_seek.poll_ms, 5);
    assert!(config.motors.is_empty());
}

/// Test parsing every homing phase.
#[test]
fn test_parse_homing_phases() {
    let toml_str = r#"
[homing]
step_period = 8
escape_degrees = 45.0
settle_ms = 20
move_timeout_ms = 8000
coarse_seek = { step = 12, poll_ms = 10, timeout_ms = 20000 }
fine_backoff = { step = -2, poll_ms = 10, timeout_ms = 5000 }
fine_reseek = { step = 1, poll_ms = 4, timeout_ms = 5000 }
reference_seek = { step = -12, poll_ms = 5, timeout_ms = 20000 }
reference_backoff = { step = 2, poll_ms = 2, timeout_ms = 5000 }
reference_reseek = { step = -1, poll_ms = 2, timeout_ms = 5000 }
"#;

    let config = parse_config(toml_str).expect("Failed to parse config");
    let homing = &config.homing;

    assert_eq!(homing.step_period, 8);
    assert_eq!(homing.escape_degrees, 45.0);
    assert_eq!(homing.settle_ms, 20);
    assert_eq!(homing.move_timeout_ms, 8000);
    assert_eq!(homing.coarse_seek.timeout_ms, 20000);
    assert_eq!(homing.fine_backoff.step, -2);
    assert_eq!(homing.fine_reseek.poll_ms, 4);
    assert_eq!(homing.reference_seek.step, -12);
    assert_eq!(homing.reference_backoff.step, 2);
    assert_eq!(homing.reference_reseek.step, -1);
}

/// Test the zero offsets of all configured motors.
#[test]
fn test_zero_offsets() {
    let toml_str = r#"
[motors.c1_inner]
clock = 1
hand = 0
zero_offset = -120

[motors.c3_outer]
clock = 3
hand = 1
zero_offset = 7
"#;

    let config = parse_config(toml_str).expect("Failed to parse config");
    let offsets: Vec<_> = config.zero_offsets().collect();

    assert_eq!(offsets, vec![(MotorId(2), -120), (MotorId(7), 7)]);
    assert_eq!(config.motor_at(3, 1).map(|(name, _)| name), Some("c3_outer"));
    assert!(config.motor_at(0, 0).is_none());
}

/// Test parsing angles given as plain numbers.
#[test]
fn test_degrees_deserialize_transparently() {
    #[derive(serde::Deserialize)]
    struct Target {
        angle: Degrees,
    }

    let target: Target = toml::from_str("angle = 270.5").expect("Failed to parse TOML");
    assert_eq!(target.angle, Degrees(270.5));
}

/// Test that an unknown motor field type is rejected.
#[test]
fn test_wrong_field_type() {
    let toml_str = r#"
[motors.c0_inner]
clock = "zero"
hand = 0
"#;

    assert!(parse_config(toml_str).is_err());
}
