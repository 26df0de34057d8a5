//! LS-8 CPU registers.
//!
//! The LS-8 has 8 general-purpose byte registers, R0 through R7, plus
//! the program counter, which is not addressable by instructions.

use serde::{Serialize, Deserialize};

/// Number of general-purpose registers.
pub const REGISTER_COUNT: usize = 8;

/// The LS-8 register file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registers {
    /// R0-R7: general-purpose registers
    pub gp: [u8; REGISTER_COUNT],

    /// PC: address of the next instruction to fetch
    pub pc: usize,
}

impl Registers {
    /// Create a new register file with all values zeroed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all registers to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Read general-purpose register `index`, if it exists.
    #[inline]
    pub fn get(&self, index: u8) -> Option<u8> {
        self.gp.get(index as usize).copied()
    }

    /// Mutable access to general-purpose register `index`, if it exists.
    #[inline]
    pub fn get_mut(&mut self, index: u8) -> Option<&mut u8> {
        self.gp.get_mut(index as usize)
    }

    /// Advance the program counter by `len` bytes.
    pub fn advance_pc(&mut self, len: usize) {
        self.pc += len;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registers_start_zeroed() {
        let regs = Registers::new();
        assert_eq!(regs.gp, [0; REGISTER_COUNT]);
        assert_eq!(regs.pc, 0);
    }

    #[test]
    fn test_register_index_bounds() {
        let mut regs = Registers::new();
        *regs.get_mut(7).unwrap() = 99;

        assert_eq!(regs.get(7), Some(99));
        assert_eq!(regs.get(8), None);
        assert!(regs.get_mut(255).is_none());
    }

    #[test]
    fn test_advance_pc() {
        let mut regs = Registers::new();
        regs.pc = 10;

        regs.advance_pc(3);
        assert_eq!(regs.pc, 13);
    }

    #[test]
    fn test_reset() {
        let mut regs = Registers::new();
        regs.gp[3] = 1;
        regs.pc = 42;
        regs.reset();
        assert_eq!(regs, Registers::new());
    }
}
