//! Persistent sensor-to-zero offsets.

use crate::config::SystemConfig;
use crate::error::StoreError;
use crate::motor::{MotorId, MAX_MOTORS};

/// Storage for per-motor calibration offsets (flash, EEPROM, RAM).
pub trait OffsetStore {
    /// Offset of one motor in steps; 0 if never stored.
    fn offset(&self, id: MotorId) -> i16;

    /// Replace the offsets of the listed motors in one commit.
    ///
    /// Either every offset is written or none is.
    fn set_offsets(&mut self, offsets: &[(MotorId, i16)]) -> Result<(), StoreError>;

    /// Replace the offset of one motor.
    fn set_offset(&mut self, id: MotorId, offset: i16) -> Result<(), StoreError> {
        self.set_offsets(&[(id, offset)])
    }
}

/// Offset store held in RAM.
///
/// Mirrors a flash page: an erased store rejects writes until it is
/// initialized.
#[derive(Debug, Clone)]
pub struct MemoryOffsetStore {
    offsets: [i16; MAX_MOTORS],
    initialized: bool,
    commits: u32,
}

impl Default for MemoryOffsetStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryOffsetStore {
    /// Initialized store with all offsets zero.
    pub const fn new() -> Self {
        Self {
            offsets: [0; MAX_MOTORS],
            initialized: true,
            commits: 0,
        }
    }

    /// Erased store; writes fail with `StoreError::NotInitialized`.
    pub const fn erased() -> Self {
        Self {
            offsets: [0; MAX_MOTORS],
            initialized: false,
            commits: 0,
        }
    }

    /// Store seeded with the configured factory offsets.
    pub fn from_config(config: &SystemConfig) -> Self {
        let mut store = Self::new();
        for (id, offset) in config.zero_offsets() {
            if let Some(slot) = store.offsets.get_mut(id.index()) {
                *slot = offset;
            }
        }
        store
    }

    /// Format the store, clearing all offsets.
    pub fn initialize(&mut self) {
        self.offsets = [0; MAX_MOTORS];
        self.initialized = true;
    }

    /// Whether the store accepts writes.
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Number of successful commits.
    #[inline]
    pub fn commits(&self) -> u32 {
        self.commits
    }
}

impl OffsetStore for MemoryOffsetStore {
    fn offset(&self, id: MotorId) -> i16 {
        self.offsets.get(id.index()).copied().unwrap_or(0)
    }

    fn set_offsets(&mut self, offsets: &[(MotorId, i16)]) -> Result<(), StoreError> {
        if !self.initialized {
            return Err(StoreError::NotInitialized);
        }
        if let Some((id, _)) = offsets.iter().find(|(id, _)| id.index() >= MAX_MOTORS) {
            return Err(StoreError::UnknownMotor(*id));
        }
        for (id, offset) in offsets {
            self.offsets[id.index()] = *offset;
        }
        self.commits += 1;
        Ok(())
    }
}
