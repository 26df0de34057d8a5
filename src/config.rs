//! Emulator configuration.

use serde::{Serialize, Deserialize};

use crate::cpu::{Clock, Cpu, Memory, DEFAULT_MEMORY_SIZE};
use crate::cpu::clock::REFERENCE_HZ;

/// Machine and clock settings for a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmulatorConfig {
    /// Number of memory cells.
    pub memory_size: usize,
    /// Instructions per second; 0 runs unthrottled.
    pub clock_hz: u32,
    /// Stop after this many instructions.
    pub max_cycles: Option<u64>,
}

impl EmulatorConfig {
    /// Build a CPU with an empty memory of the configured size.
    pub fn build_cpu(&self) -> Cpu {
        Cpu::new(Memory::new(self.memory_size))
    }

    pub fn build_clock(&self) -> Clock {
        Clock::from_hz(self.clock_hz).with_max_cycles(self.max_cycles)
    }
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            memory_size: DEFAULT_MEMORY_SIZE,
            clock_hz: REFERENCE_HZ,
            max_cycles: None,
        }
    }
}
