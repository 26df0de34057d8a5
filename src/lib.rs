//! # LS-8 Emulator
//!
//! An emulator for the LS-8, a minimal 8-bit computer used for teaching
//! how a CPU works: a byte-addressable memory, eight registers, and a
//! fetch-decode-execute cycle driven by a clock.

pub mod cpu;
pub mod asm;
pub mod config;

#[cfg(feature = "tui")]
pub mod tui;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use cpu::{Cpu, CpuState, CpuError, Memory, Registers, Instruction, Opcode};
pub use cpu::{Clock, RunSummary, StopReason, OutputSink, StdoutSink};
pub use asm::{disassemble, load_file, parse_program, LoadError};
pub use config::EmulatorConfig;

#[cfg(feature = "tui")]
pub use tui::run_debugger;
