//! CPU emulation for the LS-8.
//!
//! - 256 byte-wide memory cells (configurable)
//! - 8 general-purpose registers R0-R7 and a program counter
//! - HLT, LDI, PRN and MUL, with lengths encoded in the opcode's high bits

pub mod memory;
pub mod registers;
pub mod decode;
pub mod alu;
pub mod output;
pub mod execute;
pub mod clock;

pub use memory::{Memory, MemoryError, DEFAULT_MEMORY_SIZE};
pub use registers::Registers;
pub use decode::{Instruction, Opcode, DecodeError};
pub use alu::AluOp;
pub use output::{OutputSink, StdoutSink};
pub use execute::{Cpu, CpuError, CpuState};
pub use clock::{Clock, RunSummary, StopReason};
