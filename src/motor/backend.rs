//! Stepper backends and home sensors.
//!
//! The tick scheduler only ever asks a backend for single steps; which
//! driver chip or emulation sits behind it is up to the implementation.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::motion::Direction;

/// STEP pulse width in microseconds.
const STEP_PULSE_US: u32 = 2;

/// A device that can move one motor shaft by single steps.
///
/// `step` is called from the tick interrupt: it must not block and must
/// finish well within one tick period. Failures are not reported back.
pub trait StepperBackend {
    /// Issue one physical step.
    fn step(&mut self, direction: Direction);

    /// Reset the driver hardware.
    fn reset(&mut self) {}

    /// Position counter kept by the device itself, if any.
    fn raw_position(&self) -> Option<i32> {
        None
    }

    /// Overwrite the device's own position counter.
    fn set_raw_position(&mut self, _position: i32) {}
}

/// A binary home sensor (e.g. hall sensor facing a magnet on the hand).
pub trait HomeSensor {
    /// Whether the hand is currently over the sensor.
    ///
    /// Polled from foreground code; debouncing is up to the implementation.
    fn is_triggered(&mut self) -> bool;
}

/// Placeholder sensor for registries without homing hardware.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSensor;

impl HomeSensor for NoSensor {
    fn is_triggered(&mut self) -> bool {
        false
    }
}

/// STEP/DIR driver backend on embedded-hal pins.
///
/// Generic over:
/// - `STEP`: STEP pin type (must implement `OutputPin`)
/// - `DIR`: DIR pin type (must implement `OutputPin`)
/// - `DELAY`: Delay provider for the step pulse (must implement `DelayNs`)
pub struct PinStepper<STEP, DIR, DELAY>
where
    STEP: OutputPin,
    DIR: OutputPin,
    DELAY: DelayNs,
{
    /// STEP pin (pulse to move one step).
    step_pin: STEP,

    /// DIR pin (high = forward, or inverted).
    dir_pin: DIR,

    /// Delay provider for the pulse width.
    delay: DELAY,

    /// Current direction (cached to avoid unnecessary pin writes).
    current_direction: Option<Direction>,

    /// Whether direction pin logic is inverted.
    invert_direction: bool,

    /// Pin operations that failed since creation.
    pin_errors: u32,
}

impl<STEP, DIR, DELAY> PinStepper<STEP, DIR, DELAY>
where
    STEP: OutputPin,
    DIR: OutputPin,
    DELAY: DelayNs,
{
    /// Create a new pin backend.
    pub fn new(step_pin: STEP, dir_pin: DIR, delay: DELAY) -> Self {
        Self {
            step_pin,
            dir_pin,
            delay,
            current_direction: None,
            invert_direction: false,
            pin_errors: 0,
        }
    }

    /// Set direction inversion.
    pub fn invert_direction(mut self, invert: bool) -> Self {
        self.invert_direction = invert;
        self
    }

    /// Number of failed pin operations.
    #[inline]
    pub fn pin_errors(&self) -> u32 {
        self.pin_errors
    }

    /// Release the pins and delay.
    pub fn release(self) -> (STEP, DIR, DELAY) {
        (self.step_pin, self.dir_pin, self.delay)
    }

    fn set_direction(&mut self, direction: Direction) -> core::result::Result<(), ()> {
        if self.current_direction == Some(direction) {
            return Ok(());
        }

        let pin_high = match direction {
            Direction::Forward => !self.invert_direction,
            Direction::Backward => self.invert_direction,
        };

        if pin_high {
            self.dir_pin.set_high().map_err(|_| ())?;
        } else {
            self.dir_pin.set_low().map_err(|_| ())?;
        }

        self.current_direction = Some(direction);
        Ok(())
    }

    fn pulse(&mut self) -> core::result::Result<(), ()> {
        self.step_pin.set_high().map_err(|_| ())?;
        self.delay.delay_us(STEP_PULSE_US);
        self.step_pin.set_low().map_err(|_| ())
    }
}

impl<STEP, DIR, DELAY> StepperBackend for PinStepper<STEP, DIR, DELAY>
where
    STEP: OutputPin,
    DIR: OutputPin,
    DELAY: DelayNs,
{
    fn step(&mut self, direction: Direction) {
        if self.set_direction(direction).is_err() || self.pulse().is_err() {
            self.pin_errors = self.pin_errors.saturating_add(1);
        }
    }

    fn reset(&mut self) {
        // force a DIR write on the next step
        self.current_direction = None;
    }
}

/// Home sensor on an embedded-hal input pin.
pub struct PinSensor<P: InputPin> {
    pin: P,
    active_low: bool,
}

impl<P: InputPin> PinSensor<P> {
    /// Sensor that reads high when triggered.
    pub fn active_high(pin: P) -> Self {
        Self {
            pin,
            active_low: false,
        }
    }

    /// Sensor that reads low when triggered (typical open-drain hall sensor).
    pub fn active_low(pin: P) -> Self {
        Self {
            pin,
            active_low: true,
        }
    }

    /// Release the pin.
    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: InputPin> HomeSensor for PinSensor<P> {
    fn is_triggered(&mut self) -> bool {
        let level = if self.active_low {
            self.pin.is_low()
        } else {
            self.pin.is_high()
        };
        // a failed read counts as "not on the sensor"
        level.unwrap_or(false)
    }
}
