//! Emulated clock hand for hosts and LED-ring displays.
//!
//! An `EmulatedShaft` stands in for the physical hand: steps move a shared
//! position counter and the home sensor reads a window of that position.
//! Positions are only loaded and stored, so the shaft also works on cores
//! without atomic read-modify-write.

use core::sync::atomic::{AtomicI32, Ordering};

use crate::motion::planner::normalize_steps;
use crate::motion::Direction;

use super::backend::{HomeSensor, StepperBackend};

/// Physical state of one emulated hand.
#[derive(Debug)]
pub struct EmulatedShaft {
    position: AtomicI32,
    steps_per_revolution: u32,
    sensor_start: i32,
    sensor_width: i32,
}

impl EmulatedShaft {
    /// Shaft at physical position 0 without a sensor.
    pub const fn new(steps_per_revolution: u32) -> Self {
        Self {
            position: AtomicI32::new(0),
            steps_per_revolution,
            sensor_start: 0,
            sensor_width: 0,
        }
    }

    /// Place a sensor covering `width` steps starting at `start`.
    pub const fn with_sensor(mut self, start: i32, width: i32) -> Self {
        self.sensor_start = start;
        self.sensor_width = width;
        self
    }

    /// Start the shaft at `position` instead of 0.
    pub fn at(self, position: i32) -> Self {
        self.position.store(position, Ordering::Relaxed);
        self
    }

    /// Physical position in steps.
    #[inline]
    pub fn position(&self) -> i32 {
        self.position.load(Ordering::Relaxed)
    }

    /// Physical position within one revolution.
    #[inline]
    pub fn normalized(&self) -> i32 {
        normalize_steps(self.position(), self.steps_per_revolution)
    }

    /// Move the shaft by hand.
    #[inline]
    pub fn set_position(&self, position: i32) {
        self.position.store(position, Ordering::Relaxed);
    }

    /// Whether the hand is over the sensor window.
    pub fn on_sensor(&self) -> bool {
        if self.sensor_width <= 0 {
            return false;
        }
        let from_start = normalize_steps(
            self.normalized().wrapping_sub(self.sensor_start),
            self.steps_per_revolution,
        );
        from_start < self.sensor_width
    }

    /// Stepping backend driving this shaft.
    pub fn stepper(&self) -> EmulatedStepper<'_> {
        EmulatedStepper { shaft: self }
    }

    /// Home sensor reading this shaft.
    pub fn sensor(&self) -> EmulatedSensor<'_> {
        EmulatedSensor { shaft: self }
    }
}

/// Backend moving an [`EmulatedShaft`].
#[derive(Debug, Clone, Copy)]
pub struct EmulatedStepper<'a> {
    shaft: &'a EmulatedShaft,
}

impl StepperBackend for EmulatedStepper<'_> {
    fn step(&mut self, direction: Direction) {
        let next = self.shaft.position().wrapping_add(direction.sign());
        self.shaft.position.store(next, Ordering::Relaxed);
    }

    fn raw_position(&self) -> Option<i32> {
        Some(self.shaft.position())
    }
}

/// Sensor reading an [`EmulatedShaft`].
#[derive(Debug, Clone, Copy)]
pub struct EmulatedSensor<'a> {
    shaft: &'a EmulatedShaft,
}

impl HomeSensor for EmulatedSensor<'_> {
    fn is_triggered(&mut self) -> bool {
        self.shaft.on_sensor()
    }
}
