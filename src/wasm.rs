//! WebAssembly bindings for the LS-8 emulator.
//!
//! This module provides JavaScript-friendly wrappers around the core emulator.

use wasm_bindgen::prelude::*;
use crate::{Cpu, Memory};
use crate::asm::disasm::{disassemble_instruction, format_instruction};
use crate::asm::loader::parse_program;

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// WebAssembly-friendly CPU wrapper.
#[wasm_bindgen]
pub struct WasmCpu {
    cpu: Cpu,
    program: Vec<u8>,
    output: Vec<u8>,
}

#[wasm_bindgen]
impl WasmCpu {
    /// Create a new CPU instance with `memory_size` bytes of memory.
    #[wasm_bindgen(constructor)]
    pub fn new(memory_size: usize) -> Self {
        Self {
            cpu: Cpu::new(Memory::new(memory_size)),
            program: Vec::new(),
            output: Vec::new(),
        }
    }

    /// Load a program from LS-8 source text. Returns its length in bytes.
    #[wasm_bindgen]
    pub fn load_source(&mut self, source: &str) -> Result<usize, JsError> {
        let bytes = parse_program(source)
            .map_err(|e| JsError::new(&format!("{}", e)))?;
        self.load_bytes(&bytes)?;
        Ok(bytes.len())
    }

    /// Load a program from raw bytes.
    #[wasm_bindgen]
    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<(), JsError> {
        self.program = bytes.to_vec();
        self.reset();
        self.cpu.load_program(&self.program)
            .map_err(|e| JsError::new(&format!("{}", e)))
    }

    /// Step one instruction. Returns the disassembled instruction.
    #[wasm_bindgen]
    pub fn step(&mut self) -> Result<String, JsError> {
        let instr = self.cpu.tick(&mut self.output)
            .map_err(|e| JsError::new(&format!("{}", e)))?;

        Ok(format_instruction(&instr))
    }

    /// Run until halt or max cycles. Returns the total cycle count.
    #[wasm_bindgen]
    pub fn run(&mut self, max_cycles: u32) -> Result<u64, JsError> {
        self.cpu.run_limited(max_cycles as u64, &mut self.output)
            .map_err(|e| JsError::new(&format!("{}", e)))?;
        Ok(self.cpu.cycles)
    }

    /// Reset CPU to initial state with loaded program.
    #[wasm_bindgen]
    pub fn reset(&mut self) {
        let size = self.cpu.mem.capacity();
        self.cpu = Cpu::new(Memory::new(size));
        self.output.clear();
        if !self.program.is_empty() {
            let _ = self.cpu.load_program(&self.program);
        }
    }

    #[wasm_bindgen]
    pub fn is_running(&self) -> bool {
        self.cpu.is_running()
    }

    #[wasm_bindgen]
    pub fn is_halted(&self) -> bool {
        self.cpu.is_halted()
    }

    #[wasm_bindgen]
    pub fn cycles(&self) -> u64 {
        self.cpu.cycles
    }

    /// Get program counter.
    #[wasm_bindgen]
    pub fn pc(&self) -> usize {
        self.cpu.regs.pc
    }

    /// Get general-purpose register `index` (0-7).
    #[wasm_bindgen]
    pub fn register(&self, index: u8) -> Option<u8> {
        self.cpu.regs.get(index)
    }

    /// Get all eight registers.
    #[wasm_bindgen]
    pub fn registers(&self) -> js_sys::Uint8Array {
        js_sys::Uint8Array::from(&self.cpu.regs.gp[..])
    }

    /// Get state as string.
    #[wasm_bindgen]
    pub fn state(&self) -> String {
        format!("{:?}", self.cpu.state)
    }

    /// Get a copy of memory.
    #[wasm_bindgen]
    pub fn memory(&self) -> js_sys::Uint8Array {
        js_sys::Uint8Array::from(self.cpu.mem.as_bytes())
    }

    /// Values printed by PRN so far.
    #[wasm_bindgen]
    pub fn output(&self) -> js_sys::Uint8Array {
        js_sys::Uint8Array::from(&self.output[..])
    }

    /// Get CPU state as JSON string.
    #[wasm_bindgen]
    pub fn state_json(&self) -> Result<String, JsError> {
        serde_json::to_string(&self.cpu)
            .map_err(|e| JsError::new(&format!("{}", e)))
    }

    /// Disassemble the instruction at the current PC.
    #[wasm_bindgen]
    pub fn current_instruction(&self) -> String {
        let bytes = self.cpu.mem.as_bytes();
        match bytes.get(self.cpu.regs.pc..) {
            Some(rest) if !rest.is_empty() => disassemble_instruction(rest).0,
            _ => String::new(),
        }
    }
}

impl Default for WasmCpu {
    fn default() -> Self {
        Self::new(crate::cpu::DEFAULT_MEMORY_SIZE)
    }
}

/// Disassemble a whole program given as LS-8 source text.
#[wasm_bindgen]
pub fn wasm_disassemble(source: &str) -> Result<String, JsError> {
    let bytes = parse_program(source)
        .map_err(|e| JsError::new(&format!("{}", e)))?;
    Ok(crate::asm::disassemble(&bytes))
}
