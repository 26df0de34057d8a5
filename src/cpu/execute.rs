//! CPU execution engine for the LS-8.
//!
//! Implements the fetch-decode-execute cycle and all instruction behaviors.

use crate::cpu::{Memory, Registers};
use crate::cpu::alu::{self, AluOp};
use crate::cpu::decode::{Instruction, Opcode, DecodeError};
use crate::cpu::memory::MemoryError;
use crate::cpu::output::OutputSink;
use serde::{Serialize, Deserialize};
use thiserror::Error;
use tracing::{debug, trace, warn};

/// CPU execution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CpuState {
    /// CPU is fetching and executing instructions.
    Running,
    /// CPU has stopped, either on HLT or on a fault.
    Halted,
}

/// The LS-8 CPU.
#[derive(Clone, Serialize, Deserialize)]
pub struct Cpu {
    /// CPU registers.
    pub regs: Registers,
    /// Main memory.
    pub mem: Memory,
    /// Current execution state.
    pub state: CpuState,
    /// Instruction count (for profiling).
    pub cycles: u64,
    /// Last executed instruction (for debugging).
    last_instr: Option<Instruction>,
}

impl Cpu {
    /// Create a CPU over an already loaded memory.
    pub fn new(mem: Memory) -> Self {
        Self {
            regs: Registers::new(),
            mem,
            state: CpuState::Running,
            cycles: 0,
            last_instr: None,
        }
    }

    /// Reset the registers and state. Memory is left as loaded.
    pub fn reset(&mut self) {
        self.regs.reset();
        self.state = CpuState::Running;
        self.cycles = 0;
        self.last_instr = None;
    }

    /// Load a program into memory at address 0.
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), MemoryError> {
        self.mem.load_program(0, program)
    }

    /// Execute a single instruction.
    ///
    /// Returns the instruction that was executed. Any fault halts the CPU
    /// and leaves PC on the faulting instruction.
    pub fn tick(&mut self, out: &mut impl OutputSink) -> Result<Instruction, CpuError> {
        if self.state != CpuState::Running {
            return Err(CpuError::NotRunning(self.state));
        }

        match self.fetch_and_execute(out) {
            Ok(instr) => {
                self.cycles += 1;
                self.last_instr = Some(instr);
                Ok(instr)
            }
            Err(e) => {
                warn!(pc = self.regs.pc, error = %e, "CPU fault, halting");
                self.state = CpuState::Halted;
                Err(e)
            }
        }
    }

    /// Run until halt or error.
    ///
    /// Returns the number of instructions executed.
    pub fn run(&mut self, out: &mut impl OutputSink) -> Result<u64, CpuError> {
        let start_cycles = self.cycles;

        while self.state == CpuState::Running {
            self.tick(out)?;
        }

        Ok(self.cycles - start_cycles)
    }

    /// Run for at most `max_cycles` instructions.
    pub fn run_limited(&mut self, max_cycles: u64, out: &mut impl OutputSink) -> Result<u64, CpuError> {
        let start_cycles = self.cycles;
        let limit = self.cycles + max_cycles;

        while self.state == CpuState::Running && self.cycles < limit {
            self.tick(out)?;
        }

        Ok(self.cycles - start_cycles)
    }

    fn fetch_and_execute(&mut self, out: &mut impl OutputSink) -> Result<Instruction, CpuError> {
        let pc = self.regs.pc;

        // Fetch
        let ir = self.mem.read(pc)?;
        let opcode = Opcode::from_byte(ir).map_err(|_| CpuError::UnknownInstruction { opcode: ir, pc })?;

        // Operand fetch: as many bytes as the high bits of IR announce
        let mut operands = [0u8; 2];
        for (i, slot) in operands.iter_mut().take(opcode.operand_count()).enumerate() {
            *slot = self.mem.read(pc + 1 + i)?;
        }
        let instr = Instruction::from_parts(opcode, &operands)?;

        // Execute
        self.execute(instr, out)?;
        trace!(pc, ir, ?instr, regs = ?self.regs.gp, "execute");

        self.regs.advance_pc(instr.len());
        Ok(instr)
    }

    /// Execute a decoded instruction.
    fn execute(&mut self, instr: Instruction, out: &mut impl OutputSink) -> Result<(), CpuError> {
        match instr {
            Instruction::Hlt => {
                debug!(pc = self.regs.pc, cycles = self.cycles + 1, "HLT");
                self.state = CpuState::Halted;
            }

            Instruction::Ldi { reg, value } => {
                *self.reg_mut(reg)? = value;
            }

            Instruction::Prn { reg } => {
                let value = self.reg(reg)?;
                out.emit(value).map_err(|e| CpuError::Output(e.to_string()))?;
            }

            Instruction::Mul { reg_a, reg_b } => {
                let a = self.reg(reg_a)?;
                let b = self.reg(reg_b)?;
                *self.reg_mut(reg_a)? = alu::apply(AluOp::Mul, a, b);
            }
        }

        Ok(())
    }

    fn reg(&self, index: u8) -> Result<u8, CpuError> {
        self.regs
            .get(index)
            .ok_or(CpuError::InvalidRegister { index, pc: self.regs.pc })
    }

    fn reg_mut(&mut self, index: u8) -> Result<&mut u8, CpuError> {
        let pc = self.regs.pc;
        self.regs
            .get_mut(index)
            .ok_or(CpuError::InvalidRegister { index, pc })
    }

    /// Get the last executed instruction.
    pub fn last_instruction(&self) -> Option<Instruction> {
        self.last_instr
    }

    /// Check if the CPU is halted.
    pub fn is_halted(&self) -> bool {
        self.state == CpuState::Halted
    }

    /// Check if the CPU is running.
    pub fn is_running(&self) -> bool {
        self.state == CpuState::Running
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new(Memory::default())
    }
}

impl std::fmt::Debug for Cpu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cpu")
            .field("state", &self.state)
            .field("cycles", &self.cycles)
            .field("regs", &self.regs)
            .finish()
    }
}

/// Errors that can occur during CPU execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CpuError {
    #[error("CPU not running: {0:?}")]
    NotRunning(CpuState),

    #[error("unknown instruction {opcode:#010b} at address {pc}")]
    UnknownInstruction { opcode: u8, pc: usize },

    #[error("invalid register R{index} at address {pc}")]
    InvalidRegister { index: u8, pc: usize },

    #[error("memory error: {0}")]
    Memory(#[from] MemoryError),

    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("output error: {0}")]
    Output(String),
}
