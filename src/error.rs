//! Error types for stepper-clock.
//!
//! Provides unified error handling across configuration, motor registry,
//! path planning and zero calibration.

use core::fmt;

use crate::motor::{MotorId, MAX_MOTORS};

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all stepper-clock operations.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Motor registry or addressing error
    Motor(MotorError),
    /// Path planning error
    Motion(MotionError),
    /// Zero calibration error
    Calibration(CalibrationError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Steps per revolution too small to describe a circle
    InvalidStepsPerRevolution(u32),
    /// Tick period must be > 0
    InvalidTickPeriod(u32),
    /// Clock layout is empty or exceeds the registry capacity
    InvalidLayout {
        /// Number of clocks
        clocks: u8,
        /// Hands per clock
        hands_per_clock: u8,
    },
    /// Motor placed outside the clock layout
    MotorOutsideLayout {
        /// Motor name
        motor: heapless::String<32>,
        /// Configured clock index
        clock: u8,
        /// Configured hand index
        hand: u8,
    },
    /// Two motors configured on the same clock hand
    DuplicateHand {
        /// Clock index
        clock: u8,
        /// Hand index
        hand: u8,
    },
    /// Homing phase timing is unusable (zero poll interval or step, or a
    /// step pointing the wrong way for its phase)
    InvalidHomingPhase(&'static str),
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Motor registry and addressing errors.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorError {
    /// Clock index outside the layout
    ClockOutOfRange {
        /// Requested clock
        clock: u8,
        /// Number of clocks
        clocks: u8,
    },
    /// Hand index outside the layout
    HandOutOfRange {
        /// Requested hand
        hand: u8,
        /// Hands per clock
        hands_per_clock: u8,
    },
    /// No motor registered under this id
    UnknownMotor(MotorId),
    /// Motor id already taken by another motor
    AlreadyRegistered(MotorId),
    /// Registry storage exhausted
    RegistryFull,
    /// Motor has no home sensor but one is required
    NoSensor(MotorId),
    /// Required builder field missing
    MissingField(&'static str),
    /// Motor listed more than once in a motor set
    DuplicateMotor(MotorId),
    /// Motor built for a different number of steps per revolution
    RevolutionMismatch {
        /// Motor being registered
        id: MotorId,
        /// Steps per revolution of the motor
        motor: u32,
        /// Steps per revolution of the registry
        registry: u32,
    },
}

/// Path planning errors.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionError {
    /// Angle is NaN or infinite
    InvalidAngle(f32),
    /// Step count does not fit the position range
    Overflow,
}

/// Calibration phases, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HomingPhase {
    /// Move hands already on the sensor out of the sensor area
    Escape,
    /// Seek the sensor in large steps
    CoarseSeek,
    /// Step back until the sensor releases
    FineBackoff,
    /// Step forward until the sensor triggers again
    FineReseek,
    /// Apply the stored sensor-to-zero offset
    ApplyOffset,
}

/// Offset store errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// Backing storage is erased or not set up
    NotInitialized,
    /// Write rejected by the backing storage
    WriteFailed,
    /// No slot for this motor
    UnknownMotor(MotorId),
}

/// Zero calibration errors.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationError {
    /// A phase did not converge within its time bound
    Timeout {
        /// Phase that timed out
        phase: HomingPhase,
        /// Motors that had not reached the phase's target state
        pending: heapless::Vec<MotorId, MAX_MOTORS>,
    },
    /// Offset store rejected the commit
    Persistence(StoreError),
    /// Calibration requested for an empty motor set
    EmptySet,
    /// More motors requested than a registry can hold
    SetTooLarge(usize),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Motor(e) => write!(f, "Motor error: {}", e),
            Error::Motion(e) => write!(f, "Motion error: {}", e),
            Error::Calibration(e) => write!(f, "Calibration error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::InvalidStepsPerRevolution(v) => {
                write!(f, "Invalid steps per revolution: {}. Must be >= 2", v)
            }
            ConfigError::InvalidTickPeriod(v) => {
                write!(f, "Invalid tick period: {} us. Must be > 0", v)
            }
            ConfigError::InvalidLayout { clocks, hands_per_clock } => write!(
                f,
                "Invalid clock layout: {} clocks x {} hands (max {} motors)",
                clocks, hands_per_clock, MAX_MOTORS
            ),
            ConfigError::MotorOutsideLayout { motor, clock, hand } => write!(
                f,
                "Motor '{}' placed on clock {} hand {} outside the layout",
                motor, clock, hand
            ),
            ConfigError::DuplicateHand { clock, hand } => {
                write!(f, "Clock {} hand {} is assigned to more than one motor", clock, hand)
            }
            ConfigError::InvalidHomingPhase(phase) => {
                write!(
                    f,
                    "Invalid homing phase '{}': needs a non-zero poll interval and a step in the phase's direction",
                    phase
                )
            }
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for MotorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotorError::ClockOutOfRange { clock, clocks } => {
                write!(f, "Clock {} out of range (0-{})", clock, clocks.saturating_sub(1))
            }
            MotorError::HandOutOfRange { hand, hands_per_clock } => {
                write!(f, "Hand {} out of range (0-{})", hand, hands_per_clock.saturating_sub(1))
            }
            MotorError::UnknownMotor(id) => write!(f, "No motor registered as {}", id),
            MotorError::AlreadyRegistered(id) => write!(f, "Motor {} already registered", id),
            MotorError::RegistryFull => write!(f, "Motor registry full (max {})", MAX_MOTORS),
            MotorError::NoSensor(id) => write!(f, "Motor {} has no home sensor", id),
            MotorError::MissingField(field) => write!(f, "{} is required", field),
            MotorError::DuplicateMotor(id) => write!(f, "Motor {} listed more than once", id),
            MotorError::RevolutionMismatch { id, motor, registry } => write!(
                f,
                "Motor {} uses {} steps per revolution, registry uses {}",
                id, motor, registry
            ),
        }
    }
}

impl fmt::Display for MotionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionError::InvalidAngle(v) => write!(f, "Invalid angle: {}", v),
            MotionError::Overflow => write!(f, "Step count overflow"),
        }
    }
}

impl fmt::Display for HomingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HomingPhase::Escape => "escape",
            HomingPhase::CoarseSeek => "coarse seek",
            HomingPhase::FineBackoff => "fine backoff",
            HomingPhase::FineReseek => "fine re-seek",
            HomingPhase::ApplyOffset => "apply offset",
        };
        f.write_str(name)
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotInitialized => write!(f, "offset storage is erased, initialize it first"),
            StoreError::WriteFailed => write!(f, "offset storage write failed"),
            StoreError::UnknownMotor(id) => write!(f, "no offset slot for motor {}", id),
        }
    }
}

impl fmt::Display for CalibrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalibrationError::Timeout { phase, pending } => {
                write!(f, "{} timed out, {} motor(s) pending", phase, pending.len())
            }
            CalibrationError::Persistence(e) => write!(f, "Persistence failure: {}", e),
            CalibrationError::EmptySet => write!(f, "No motors to calibrate"),
            CalibrationError::SetTooLarge(len) => {
                write!(f, "{} motors requested, at most {} can be calibrated", len, MAX_MOTORS)
            }
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<MotorError> for Error {
    fn from(e: MotorError) -> Self {
        Error::Motor(e)
    }
}

impl From<MotionError> for Error {
    fn from(e: MotionError) -> Self {
        Error::Motion(e)
    }
}

impl From<CalibrationError> for Error {
    fn from(e: CalibrationError) -> Self {
        Error::Calibration(e)
    }
}

impl From<StoreError> for Error {
    fn from(e: StoreError) -> Self {
        Error::Calibration(CalibrationError::Persistence(e))
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for MotorError {}

#[cfg(feature = "std")]
impl std::error::Error for MotionError {}

#[cfg(feature = "std")]
impl std::error::Error for CalibrationError {}

#[cfg(feature = "std")]
impl std::error::Error for StoreError {}
