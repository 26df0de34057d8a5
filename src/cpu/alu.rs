//! Arithmetic/logic unit.
//!
//! The ALU never touches the register file: the CPU reads the source
//! registers, hands the values over, and writes the result back.

use serde::{Serialize, Deserialize};

/// Operations the ALU can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AluOp {
    /// Multiply, keeping the low 8 bits of the product.
    Mul,
}

/// Apply `op` to two register values.
#[inline]
pub fn apply(op: AluOp, a: u8, b: u8) -> u8 {
    match op {
        AluOp::Mul => a.wrapping_mul(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul() {
        assert_eq!(apply(AluOp::Mul, 8, 9), 72);
        assert_eq!(apply(AluOp::Mul, 0, 255), 0);
    }

    #[test]
    fn test_mul_wraps_to_eight_bits() {
        // 40000 = 156 * 256 + 64
        assert_eq!(apply(AluOp::Mul, 200, 200), 64);
        assert_eq!(apply(AluOp::Mul, 16, 16), 0);
        assert_eq!(apply(AluOp::Mul, 255, 255), 1);
    }
}
