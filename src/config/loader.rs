//! Configuration loading from files (std only).

use std::fs;
use std::path::Path;

use crate::error::{ConfigError, Error, Result};

use super::SystemConfig;

/// Read, parse and validate a clock array description.
///
/// # Errors
///
/// `ConfigError::IoError` if the file cannot be read, otherwise the errors
/// of [`parse_config`].
///
/// # Example
///
/// ```rust,ignore
/// use stepper_clock::load_config;
///
/// let config = load_config("clock.toml")?;
/// let layout = config.clock.layout();
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SystemConfig> {
    match fs::read_to_string(path.as_ref()) {
        Ok(text) => parse_config(&text),
        Err(e) => Err(ConfigError::IoError(truncated(&e.to_string())).into()),
    }
}

/// Parse and validate a clock array description held in memory.
///
/// Missing `[clock]` and `[homing]` fields take their defaults.
///
/// # Errors
///
/// `ConfigError::ParseError` for malformed TOML, otherwise the first
/// violation reported by [`validate_config`](super::validate_config).
pub fn parse_config(text: &str) -> Result<SystemConfig> {
    let config = toml::from_str::<SystemConfig>(text)
        .map_err(|e| Error::Config(ConfigError::ParseError(truncated(e.message()))))?;
    super::validation::validate_config(&config)?;
    Ok(config)
}

/// Keep as much of a message as fits the error payload.
fn truncated(msg: &str) -> heapless::String<128> {
    let mut out = heapless::String::new();
    msg.chars().take_while(|c| out.push(*c).is_ok()).for_each(drop);
    out
}
