//! System configuration - root configuration structure.

use heapless::{FnvIndexMap, String};
use serde::Deserialize;

use crate::motor::{MotorId, MAX_MOTORS};

use super::clock::ClockConfig;
use super::homing::HomingConfig;
use super::motor::MotorConfig;

/// Root configuration structure from TOML.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SystemConfig {
    /// Clock array geometry and timing.
    #[serde(default)]
    pub clock: ClockConfig,

    /// Homing parameters.
    #[serde(default)]
    pub homing: HomingConfig,

    /// Named motor configurations.
    #[serde(default)]
    pub motors: FnvIndexMap<String<32>, MotorConfig, MAX_MOTORS>,
}

impl SystemConfig {
    /// Get a motor configuration by name.
    pub fn motor(&self, name: &str) -> Option<&MotorConfig> {
        self.motors
            .iter()
            .find(|(k, _)| k.as_str() == name)
            .map(|(_, v)| v)
    }

    /// Find the motor configured on a clock hand.
    pub fn motor_at(&self, clock: u8, hand: u8) -> Option<(&str, &MotorConfig)> {
        self.motors
            .iter()
            .find(|(_, m)| m.clock == clock && m.hand == hand)
            .map(|(k, v)| (k.as_str(), v))
    }

    /// Registry id of a named motor.
    ///
    /// Returns `None` if the motor does not exist or sits outside the layout.
    pub fn motor_id(&self, name: &str) -> Option<MotorId> {
        let motor = self.motor(name)?;
        self.clock.layout().id(motor.clock, motor.hand).ok()
    }

    /// List all motor names.
    pub fn motor_names(&self) -> impl Iterator<Item = &str> {
        self.motors.keys().map(|s| s.as_str())
    }

    /// Zero offsets of all motors that fit the layout.
    pub fn zero_offsets(&self) -> impl Iterator<Item = (MotorId, i16)> + '_ {
        let layout = self.clock.layout();
        self.motors
            .values()
            .filter_map(move |m| layout.id(m.clock, m.hand).ok().map(|id| (id, m.zero_offset)))
    }
}
