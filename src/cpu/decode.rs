//! Instruction decoder for the LS-8.
//!
//! Every instruction is an opcode byte followed by up to two operand
//! bytes. The two high bits of the opcode give the operand count, so
//! the length of an instruction is known before it is decoded.

use serde::{Serialize, Deserialize};
use thiserror::Error;

/// Number of operand bytes that follow `opcode`.
#[inline]
pub const fn operand_count(opcode: u8) -> usize {
    (opcode >> 6) as usize
}

/// Total length in bytes of the instruction starting with `opcode`.
#[inline]
pub const fn instruction_length(opcode: u8) -> usize {
    operand_count(opcode) + 1
}

/// The opcodes understood by this CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Opcode {
    Hlt = 0b0000_0001,
    Ldi = 0b1001_1001,
    Prn = 0b0100_0011,
    Mul = 0b1010_1010,
}

impl Opcode {
    pub const ALL: [Opcode; 4] = [Opcode::Hlt, Opcode::Ldi, Opcode::Prn, Opcode::Mul];

    /// Look up an opcode by exact byte match.
    pub fn from_byte(byte: u8) -> Result<Self, DecodeError> {
        match byte {
            0b0000_0001 => Ok(Opcode::Hlt),
            0b1001_1001 => Ok(Opcode::Ldi),
            0b0100_0011 => Ok(Opcode::Prn),
            0b1010_1010 => Ok(Opcode::Mul),
            _ => Err(DecodeError::InvalidOpcode(byte)),
        }
    }

    #[inline]
    pub fn byte(self) -> u8 {
        self as u8
    }

    #[inline]
    pub fn operand_count(self) -> usize {
        operand_count(self.byte())
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Hlt => "HLT",
            Opcode::Ldi => "LDI",
            Opcode::Prn => "PRN",
            Opcode::Mul => "MUL",
        }
    }
}

/// Decoded LS-8 instruction.
///
/// Register operands are raw bytes; whether they name one of R0-R7 is
/// checked when the instruction executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    /// Halt the CPU.
    Hlt,

    /// Load immediate: R[reg] := value
    Ldi { reg: u8, value: u8 },

    /// Print the decimal value of R[reg].
    Prn { reg: u8 },

    /// Multiply: R[reg_a] := R[reg_a] * R[reg_b] (mod 256)
    Mul { reg_a: u8, reg_b: u8 },
}

impl Instruction {
    /// Build an instruction from its opcode and operand bytes.
    ///
    /// `operands` must hold at least `opcode.operand_count()` bytes.
    pub fn from_parts(opcode: Opcode, operands: &[u8]) -> Result<Self, DecodeError> {
        let needed = opcode.operand_count();
        if operands.len() < needed {
            return Err(DecodeError::Truncated {
                opcode: opcode.byte(),
                needed,
                available: operands.len(),
            });
        }

        Ok(match opcode {
            Opcode::Hlt => Instruction::Hlt,
            Opcode::Ldi => Instruction::Ldi { reg: operands[0], value: operands[1] },
            Opcode::Prn => Instruction::Prn { reg: operands[0] },
            Opcode::Mul => Instruction::Mul { reg_a: operands[0], reg_b: operands[1] },
        })
    }

    pub fn opcode(&self) -> Opcode {
        match self {
            Instruction::Hlt => Opcode::Hlt,
            Instruction::Ldi { .. } => Opcode::Ldi,
            Instruction::Prn { .. } => Opcode::Prn,
            Instruction::Mul { .. } => Opcode::Mul,
        }
    }

    /// Encoded length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        instruction_length(self.opcode().byte())
    }
}

/// Decode the instruction at the start of `bytes`.
pub fn decode(bytes: &[u8]) -> Result<Instruction, DecodeError> {
    let (&first, rest) = bytes.split_first().ok_or(DecodeError::Empty)?;
    let opcode = Opcode::from_byte(first)?;
    Instruction::from_parts(opcode, rest)
}

/// Encode an instruction back to its byte form.
pub fn encode(instr: &Instruction) -> Vec<u8> {
    let op = instr.opcode().byte();
    match *instr {
        Instruction::Hlt => vec![op],
        Instruction::Ldi { reg, value } => vec![op, reg, value],
        Instruction::Prn { reg } => vec![op, reg],
        Instruction::Mul { reg_a, reg_b } => vec![op, reg_a, reg_b],
    }
}

/// Errors that can occur during instruction decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unknown instruction: {0:#010b}")]
    InvalidOpcode(u8),

    #[error("instruction {opcode:#010b} needs {needed} operand bytes, found {available}")]
    Truncated { opcode: u8, needed: usize, available: usize },

    #[error("no bytes to decode")]
    Empty,
}
