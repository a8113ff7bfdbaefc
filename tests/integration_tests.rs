//! Integration tests for stepper-clock.
//!
//! These tests drive the whole stack on the host: configuration, registry,
//! tick scheduler, planner and zero calibration against emulated hands.

mod unit;

use proptest::prelude::*;

use stepper_clock::config::{parse_config, SystemConfig};
use stepper_clock::error::{CalibrationError, Error, HomingPhase, MotorError, StoreError};
use stepper_clock::homing::{MemoryOffsetStore, OffsetStore, ZeroCalibrator};
use stepper_clock::motion::{degrees_to_steps, normalize_degrees, plan_path, Direction, MoveCommand, MoveMode, Ramp};
use stepper_clock::motor::{
    EmulatedSensor, EmulatedShaft, EmulatedStepper, Motor, MotorBuilder, MotorId, MotorRegistry, SharedRegistry,
    StepperBackend,
};
use stepper_clock::sequencer::{Sequencer, TickingDelay};
use stepper_clock::Degrees;

// =============================================================================
// Test fixtures
// =============================================================================

const SPR: u32 = 720;

/// Two clocks, two hands each; clock 1 hand 1 has no sensor.
const CLOCK_CONFIG: &str = r#"
[clock]
steps_per_revolution = 720
clocks = 2
hands_per_clock = 2

[motors.c0_inner]
clock = 0
hand = 0

[motors.c0_outer]
clock = 0
hand = 1
zero_offset = 15

[motors.c1_inner]
clock = 1
hand = 0
zero_offset = -30

[motors.c1_outer]
clock = 1
hand = 1
has_sensor = false
"#;

type Clock<'a> = SharedRegistry<EmulatedStepper<'a>, EmulatedSensor<'a>>;
type Calibrator<'c, 'a> = ZeroCalibrator<'c, EmulatedStepper<'a>, EmulatedSensor<'a>, TickingDelay<'c, EmulatedStepper<'a>, EmulatedSensor<'a>>, MemoryOffsetStore>;

fn config() -> SystemConfig {
    parse_config(CLOCK_CONFIG).expect("Should parse clock config")
}

fn clock<'a>(config: &SystemConfig, shafts: &'a [EmulatedShaft; 4]) -> Clock<'a> {
    let registry = MotorRegistry::from_config(config, |_, id, motor| {
        let shaft = &shafts[id.index()];
        Ok((shaft.stepper(), motor.has_sensor.then(|| shaft.sensor())))
    })
    .expect("Should build registry");
    SharedRegistry::new(registry)
}

fn calibrator<'c, 'a>(config: &SystemConfig, clock: &'c Clock<'a>, store: MemoryOffsetStore) -> Calibrator<'c, 'a> {
    let seq = Sequencer::new(clock, TickingDelay::new(clock, &config.clock))
        .with_move_timeout(config.homing.move_timeout_ms);
    ZeroCalibrator::new(seq, store, config.homing.clone())
}

/// Shafts with a 20-step sensor window at the given physical positions.
fn shafts(windows: [i32; 4]) -> [EmulatedShaft; 4] {
    windows.map(|start| EmulatedShaft::new(SPR).with_sensor(start, 20))
}

#[derive(Default)]
struct StepCounter {
    net: i32,
}

impl StepperBackend for StepCounter {
    fn step(&mut self, direction: Direction) {
        self.net += direction.sign();
    }
}

fn motor(position: i32) -> Motor<StepCounter> {
    MotorBuilder::new()
        .id(MotorId(0))
        .backend(StepCounter::default())
        .steps_per_revolution(SPR)
        .position(position)
        .build()
        .expect("Should build motor")
}

// =============================================================================
// Registry from configuration
// =============================================================================

#[test]
fn registry_from_config() {
    let config = config();
    let shafts = shafts([100, 200, 300, 400]);
    let clock = clock(&config, &shafts);

    clock.with(|r| {
        assert_eq!(r.len(), 4);
        assert_eq!(r.sensor_ids().as_slice(), &[MotorId(0), MotorId(1), MotorId(2)]);
        assert_eq!(r.clock_ids(1).unwrap().as_slice(), &[MotorId(2), MotorId(3)]);
        assert_eq!(r.motor(MotorId(3)).unwrap().name(), "c1_outer");
        assert!(matches!(
            r.sensor_triggered(MotorId(3)),
            Err(Error::Motor(MotorError::NoSensor(MotorId(3))))
        ));
    });
}

#[test]
fn move_to_angle_on_emulated_hands() {
    let config = config();
    let shafts = shafts([100, 200, 300, 400]);
    let clock = clock(&config, &shafts);
    let mut seq = Sequencer::new(&clock, TickingDelay::new(&clock, &config.clock));

    clock
        .with(|r| {
            r.move_to_angle(MotorId(0), Degrees(90.0), MoveMode::Clockwise, 2, Ramp::BOTH)?;
            r.move_to_angle(MotorId(1), Degrees(90.0), MoveMode::CounterClockwise, 2, Ramp::NONE)?;
            r.move_to_angle(MotorId(2), Degrees(270.0), MoveMode::Shortest, 0, Ramp::NONE)
        })
        .unwrap();
    seq.move_and_wait(10);

    assert_eq!(shafts[0].position(), 180);
    assert_eq!(shafts[1].position(), -540);
    assert_eq!(shafts[2].position(), -180);
    assert_eq!(shafts[3].position(), 0);
    clock.with(|r| {
        for id in [MotorId(0), MotorId(1), MotorId(2)] {
            let angle = r.angle(id).unwrap();
            assert!((angle.value() - if id == MotorId(2) { 270.0 } else { 90.0 }).abs() < 0.01);
        }
    });
}

// =============================================================================
// Tick scheduler
// =============================================================================

proptest! {
    #[test]
    fn idle_is_a_fixed_point(position in -100_000i32..100_000, ticks in 0usize..500) {
        let mut m = motor(position);
        for _ in 0..ticks {
            prop_assert!(!m.tick().is_busy());
        }
        prop_assert_eq!(m.position().steps(), position);
        prop_assert_eq!(m.steps_remaining(), 0);
        prop_assert_eq!(m.backend().net, 0);
    }

    #[test]
    fn moves_land_exactly(
        start in -10_000i32..10_000,
        steps in -1500i32..1500,
        period in 0u16..4,
        up in any::<bool>(),
        down in any::<bool>(),
    ) {
        let mut m = motor(start);
        m.arm(MoveCommand::new(steps, period).with_ramp(Ramp::new(up, down)));

        // slowest possible step: base period plus the largest ramp increment
        let bound = steps.unsigned_abs() as usize * (period as usize + 11) + 1;
        let mut last = steps;
        let mut ticks = 0;
        while m.tick().is_busy() {
            let remaining = m.steps_remaining();
            prop_assert!(remaining.abs() <= last.abs());
            prop_assert!(remaining == 0 || remaining.signum() == steps.signum());
            prop_assert!(m.period_counter() <= m.step_period());
            last = remaining;
            ticks += 1;
            prop_assert!(ticks <= bound);
        }

        prop_assert_eq!(m.steps_remaining(), 0);
        prop_assert_eq!(m.position().steps(), start + steps);
        prop_assert_eq!(m.backend().net, steps);
    }

    #[test]
    fn ramp_shapes_step_period(steps in 301i32..2000, period in 0u16..6) {
        let mut m = motor(0);
        m.arm(MoveCommand::new(steps, period).with_ramp(Ramp::BOTH));

        let mut accelerating: Option<u16> = None;
        let mut decelerating: Option<u16> = None;
        let mut position = 0;
        while m.tick().is_busy() {
            if m.position().steps() == position {
                continue;
            }
            position = m.position().steps();
            let to_go = m.steps_remaining();
            let current = m.step_period();
            prop_assert!(current >= period);
            if to_go > 300 {
                if let Some(previous) = accelerating {
                    prop_assert!(current <= previous);
                }
                accelerating = Some(current);
            } else if to_go < 300 {
                if let Some(previous) = decelerating {
                    prop_assert!(current >= previous);
                }
                decelerating = Some(current);
            }
        }
        prop_assert_eq!(position, steps);
    }
}

#[test]
fn rearming_supersedes_running_move() {
    let mut m = motor(0);
    m.arm(MoveCommand::new(100, 0));
    for _ in 0..10 {
        m.tick();
    }
    m.arm(MoveCommand::new(-5, 0));
    while m.tick().is_busy() {}
    assert_eq!(m.position().steps(), 5);
}

// =============================================================================
// Path planner
// =============================================================================

proptest! {
    #[test]
    fn planned_delta_respects_mode(
        angle in -1000.0f32..1000.0,
        position in -1_000_000i32..1_000_000,
        spr in 2u32..10_000,
    ) {
        let rev = spr as i32;
        let cw = plan_path(Degrees(angle), MoveMode::Clockwise, position, spr).unwrap();
        let ccw = plan_path(Degrees(angle), MoveMode::CounterClockwise, position, spr).unwrap();
        let short = plan_path(Degrees(angle), MoveMode::Shortest, position, spr).unwrap();

        prop_assert!((0..rev).contains(&cw));
        prop_assert!(ccw > -rev && ccw <= 0);
        prop_assert!(short.abs() <= rev / 2);
    }

    #[test]
    fn shortest_move_lands_on_target(
        angle in -720.0f32..720.0,
        position in -1_000_000i32..1_000_000,
    ) {
        let delta = plan_path(Degrees(angle), MoveMode::Shortest, position, SPR).unwrap();
        let target = degrees_to_steps(normalize_degrees(Degrees(angle)).unwrap(), SPR)
            .unwrap()
            .rem_euclid(SPR as i32);
        prop_assert_eq!((position + delta).rem_euclid(SPR as i32), target);
    }
}

#[test]
fn half_turn_tie_keeps_raw_sign() {
    assert_eq!(plan_path(Degrees(180.0), MoveMode::Shortest, 0, SPR).unwrap(), 360);
    assert_eq!(plan_path(Degrees(0.0), MoveMode::Shortest, 360, SPR).unwrap(), -360);
}

#[test]
fn non_finite_angles_rejected() {
    for angle in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
        assert!(plan_path(Degrees(angle), MoveMode::Shortest, 0, SPR).is_err());
    }
}

// =============================================================================
// Zero calibration
// =============================================================================

#[test]
fn calibration_converges_onto_sensor_edge() {
    let config = config();
    let shafts = shafts([100, 200, 300, 400]);
    shafts[0].set_position(-250);
    shafts[1].set_position(205); // already on its sensor
    shafts[2].set_position(1000);
    let clock = clock(&config, &shafts);
    let mut cal = calibrator(&config, &clock, MemoryOffsetStore::new());

    cal.calibrate_set(&[MotorId(0), MotorId(1), MotorId(2)]).unwrap();

    for (index, shaft) in shafts.iter().take(3).enumerate() {
        assert_eq!(shaft.normalized(), [100, 200, 300][index]);
        assert!(shaft.on_sensor());
    }
    clock.with(|r| {
        for id in [MotorId(0), MotorId(1), MotorId(2)] {
            assert_eq!(r.position(id).unwrap(), 0);
            assert!(r.is_idle(id).unwrap());
        }
    });
    // the hand without sensor never moved
    assert_eq!(shafts[3].position(), 0);
}

#[test]
fn calibration_applies_stored_offsets() {
    let config = config();
    let shafts = shafts([100, 200, 300, 400]);
    let clock = clock(&config, &shafts);
    let mut cal = calibrator(&config, &clock, MemoryOffsetStore::from_config(&config));

    cal.calibrate_all().unwrap();

    assert_eq!(shafts[0].normalized(), 100);
    assert_eq!(shafts[1].normalized(), 215);
    assert_eq!(shafts[2].normalized(), 270);
    clock.with(|r| assert!(r.sensor_ids().iter().all(|id| r.position(*id).unwrap() == 0)));
}

#[test]
fn calibrate_single_hand() {
    let config = config();
    let shafts = shafts([100, 200, 300, 400]);
    let clock = clock(&config, &shafts);
    clock.with(|r| r.set_position(MotorId(2), 1234)).unwrap();
    let mut cal = calibrator(&config, &clock, MemoryOffsetStore::new());

    cal.calibrate_hand(1, 0).unwrap();

    assert_eq!(shafts[2].normalized(), 300);
    assert_eq!(shafts[0].position(), 0);
    assert_eq!(clock.with(|r| r.position(MotorId(2))).unwrap(), 0);
}

#[test]
fn calibration_times_out_without_sensor_signal() {
    let config = config();
    let shafts = [
        EmulatedShaft::new(SPR).with_sensor(100, 20),
        EmulatedShaft::new(SPR), // sensor never triggers
        EmulatedShaft::new(SPR).with_sensor(300, 20),
        EmulatedShaft::new(SPR),
    ];
    let clock = clock(&config, &shafts);
    let mut cal = calibrator(&config, &clock, MemoryOffsetStore::new());

    let result = cal.calibrate_set(&[MotorId(0), MotorId(1), MotorId(2)]);

    match result {
        Err(Error::Calibration(CalibrationError::Timeout { phase, pending })) => {
            assert_eq!(phase, HomingPhase::CoarseSeek);
            assert_eq!(pending.as_slice(), &[MotorId(1)]);
        }
        other => panic!("unexpected result: {:?}", other),
    }

    // converged hands stay on their sensor, positions are not zeroed
    assert!(shafts[0].on_sensor());
    assert!(shafts[2].on_sensor());
    assert_ne!(clock.with(|r| r.position(MotorId(0))).unwrap(), 0);

    let (seq, _) = cal.release();
    let elapsed = seq.release().elapsed_ms();
    let bound = config.homing.coarse_seek.timeout_ms as u64;
    assert!(elapsed > bound);
    assert!(elapsed <= bound + 2 * config.homing.coarse_seek.poll_ms as u64);
}

#[test]
fn invalid_sets_are_rejected_before_moving() {
    let config = config();
    let shafts = shafts([100, 200, 300, 400]);
    let clock = clock(&config, &shafts);
    let mut cal = calibrator(&config, &clock, MemoryOffsetStore::new());

    assert!(matches!(
        cal.calibrate_set(&[]),
        Err(Error::Calibration(CalibrationError::EmptySet))
    ));
    assert!(matches!(
        cal.calibrate_set(&[MotorId(0), MotorId(3)]),
        Err(Error::Motor(MotorError::NoSensor(MotorId(3))))
    ));
    assert!(matches!(
        cal.calibrate_set(&[MotorId(9)]),
        Err(Error::Motor(MotorError::UnknownMotor(MotorId(9))))
    ));
    assert!(matches!(
        cal.calibrate_hand(2, 0),
        Err(Error::Motor(MotorError::ClockOutOfRange { clock: 2, clocks: 2 }))
    ));

    assert!(shafts.iter().all(|s| s.position() == 0));
}

#[test]
fn repeated_and_oversized_sets_are_rejected() {
    let config = config();
    let shafts = shafts([100, 200, 300, 400]);
    let clock = clock(&config, &shafts);
    let mut cal = calibrator(&config, &clock, MemoryOffsetStore::new());

    assert!(matches!(
        cal.calibrate_set(&[MotorId(0), MotorId(1), MotorId(0)]),
        Err(Error::Motor(MotorError::DuplicateMotor(MotorId(0))))
    ));
    assert!(matches!(
        cal.calibrate_set(&[MotorId(0); 17]),
        Err(Error::Calibration(CalibrationError::SetTooLarge(17)))
    ));
    assert!(matches!(
        cal.derive_and_commit_offsets(&[MotorId(1), MotorId(1)]),
        Err(Error::Motor(MotorError::DuplicateMotor(MotorId(1))))
    ));

    assert!(shafts.iter().all(|s| s.position() == 0));
    assert_eq!(cal.store().commits(), 0);
}

#[test]
fn sensor_queries_report_each_motor_once() {
    let config = config();
    let shafts = shafts([0, 200, 300, 400]);
    let clock = clock(&config, &shafts);

    let on_sensor = clock.sensor_mismatch(&[MotorId(0); 40], false);
    assert_eq!(on_sensor.as_slice(), &[MotorId(0)]);
    let off_sensor = clock.sensor_mismatch(&[MotorId(1), MotorId(2), MotorId(1), MotorId(2)], true);
    assert_eq!(off_sensor.as_slice(), &[MotorId(1), MotorId(2)]);
}

#[test]
fn derive_offsets_from_twelve_oclock() {
    let config = config();
    let shafts = shafts([100, 200, 300, 400]);
    shafts[1].set_position(720 * 3);
    let clock = clock(&config, &shafts);
    clock.with(|r| r.set_position(MotorId(0), 77)).unwrap();
    let mut cal = calibrator(&config, &clock, MemoryOffsetStore::new());

    let offsets = cal.derive_and_commit_offsets(&[MotorId(0), MotorId(1)]).unwrap();

    // seeking backwards from twelve o'clock finds the far edge of the window
    assert_eq!(offsets.as_slice(), &[(MotorId(0), 601), (MotorId(1), 501)]);
    assert_eq!(cal.store().offset(MotorId(0)), 601);
    assert_eq!(cal.store().offset(MotorId(1)), 501);
    assert_eq!(cal.store().commits(), 1);

    // hands are back at twelve o'clock
    assert_eq!(shafts[0].normalized(), 0);
    assert_eq!(shafts[1].normalized(), 0);
    clock.with(|r| {
        assert_eq!(r.position(MotorId(0)).unwrap(), 0);
        assert_eq!(r.position(MotorId(1)).unwrap(), 0);
    });
}

#[test]
fn failed_commit_keeps_previous_offsets() {
    let config = config();
    let shafts = shafts([100, 200, 300, 400]);
    let clock = clock(&config, &shafts);
    let mut cal = calibrator(&config, &clock, MemoryOffsetStore::erased());

    let result = cal.derive_and_commit_offsets(&[MotorId(0)]);
    assert!(matches!(
        result,
        Err(Error::Calibration(CalibrationError::Persistence(StoreError::NotInitialized)))
    ));

    assert_eq!(cal.store().offset(MotorId(0)), 0);
    assert_eq!(cal.store().commits(), 0);
    // no offset move happened: the hand waits on its sensor edge
    assert!(shafts[0].on_sensor());
    assert_eq!(clock.with(|r| r.position(MotorId(0))).unwrap(), -601);
}

#[test]
fn set_single_offset() {
    let config = config();
    let shafts = shafts([100, 200, 300, 400]);
    let clock = clock(&config, &shafts);
    let mut cal = calibrator(&config, &clock, MemoryOffsetStore::from_config(&config));

    cal.set_offset(1, 1, 42).unwrap();
    assert_eq!(cal.store().offset(MotorId(3)), 42);
    assert_eq!(cal.store().offset(MotorId(2)), -30);

    cal.store_mut().set_offsets(&[(MotorId(0), -5)]).unwrap();
    assert_eq!(cal.store().offset(MotorId(0)), -5);

    assert!(matches!(
        cal.set_offset(0, 2, 1),
        Err(Error::Motor(MotorError::HandOutOfRange { hand: 2, .. }))
    ));
}
