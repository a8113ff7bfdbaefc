//! Motor configuration from TOML.

use serde::Deserialize;

/// Configuration of one clock-hand motor (`[motors.<name>]` table).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MotorConfig {
    /// Clock index the motor belongs to.
    pub clock: u8,

    /// Hand index within the clock (0 = inner shaft).
    pub hand: u8,

    /// Whether a home sensor is fitted for this hand.
    #[serde(default = "default_has_sensor")]
    pub has_sensor: bool,

    /// Factory sensor-to-zero offset in steps, used to seed the offset store.
    #[serde(default)]
    pub zero_offset: i16,

    /// Invert direction pin logic.
    #[serde(default)]
    pub invert_direction: bool,
}

fn default_has_sensor() -> bool {
    true
}

impl MotorConfig {
    /// Create a motor configuration with a sensor and no offset.
    pub fn new(clock: u8, hand: u8) -> Self {
        Self {
            clock,
            hand,
            has_sensor: true,
            zero_offset: 0,
            invert_direction: false,
        }
    }
}
