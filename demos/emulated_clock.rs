//! Example: A clock array on emulated hands.
//!
//! This example demonstrates how to:
//! - Build a registry from a TOML configuration
//! - Drive the tick scheduler from the host with `TickingDelay`
//! - Calibrate every sensor-equipped hand to twelve o'clock
//! - Show a time by moving hour and minute hands along the shortest path
//!
//! Run with: `cargo run --example emulated_clock --features std`

use stepper_clock::{
    homing::{MemoryOffsetStore, ZeroCalibrator},
    motor::EmulatedShaft,
    parse_config, Degrees, MotorRegistry, MoveMode, Ramp, Result, Sequencer, SharedRegistry, TickingDelay,
};

const CLOCK_TOML: &str = r#"
[clock]
steps_per_revolution = 720
clocks = 2
hands_per_clock = 2

[homing]
step_period = 2

[motors.c0_hour]
clock = 0
hand = 0
zero_offset = -20

[motors.c0_minute]
clock = 0
hand = 1
zero_offset = 15

[motors.c1_hour]
clock = 1
hand = 0

[motors.c1_minute]
clock = 1
hand = 1
"#;

fn main() -> Result<()> {
    println!("=== Emulated Clock Array Example ===\n");

    let config = parse_config(CLOCK_TOML)?;
    let spr = config.clock.steps_per_revolution;

    // Hands start scattered; each sensor window is 20 steps wide
    let shafts = [
        EmulatedShaft::new(spr).with_sensor(700, 20).at(130),
        EmulatedShaft::new(spr).with_sensor(10, 20).at(15),
        EmulatedShaft::new(spr).with_sensor(0, 20).at(400),
        EmulatedShaft::new(spr).with_sensor(360, 20).at(90),
    ];

    let registry = MotorRegistry::from_config(&config, |_, id, motor| {
        let shaft = &shafts[id.index()];
        Ok((shaft.stepper(), motor.has_sensor.then(|| shaft.sensor())))
    })?;
    let clock = SharedRegistry::new(registry);

    let seq = Sequencer::new(&clock, TickingDelay::new(&clock, &config.clock))
        .with_move_timeout(config.homing.move_timeout_ms);
    let store = MemoryOffsetStore::from_config(&config);

    println!("Calibrating {} hands...", clock.with(|r| r.len()));
    let mut calibrator = ZeroCalibrator::new(seq, store, config.homing.clone());
    calibrator.calibrate_all()?;
    let (mut seq, _store) = calibrator.release();

    for (index, shaft) in shafts.iter().enumerate() {
        println!("  M{}: shaft at step {:>3}", index, shaft.normalized());
    }

    // 10:45 on clock 0, 3:20 on clock 1
    let times = [(0u8, 10u8, 45u8), (1, 3, 20)];
    clock.with(|r| {
        for (c, hour, minute) in times {
            let hour_hand = r.id(c, 0)?;
            let minute_hand = r.id(c, 1)?;
            r.move_to_angle(hour_hand, Degrees::from_hour(hour, minute), MoveMode::Shortest, 2, Ramp::BOTH)?;
            r.move_to_angle(minute_hand, Degrees::from_minute(minute), MoveMode::Shortest, 2, Ramp::BOTH)?;
        }
        Ok::<_, stepper_clock::Error>(())
    })?;
    let elapsed = seq.move_and_wait(10);

    println!("\nShowing the time after {} ms:", elapsed);
    clock.with(|r| {
        for id in r.ids() {
            if let (Ok(motor), Ok(angle)) = (r.motor(id), r.angle(id)) {
                println!("  {:<10} {:>6.1} deg  [{}]", motor.name(), angle.value(), motor.status());
            }
        }
    });

    let simulated = seq.release().elapsed_ms();
    println!("\nSimulated time: {} ms", simulated);
    println!("\n=== Example Complete ===");

    Ok(())
}
