//! Disassembler for LS-8 programs.
//!
//! Converts machine bytes back to readable mnemonics.

use crate::cpu::decode::{decode, DecodeError, Instruction};

/// Disassemble the instruction at the start of `bytes`.
///
/// Returns the text and the number of bytes it covers. Unknown opcodes
/// render as `???` and cover a single byte.
pub fn disassemble_instruction(bytes: &[u8]) -> (String, usize) {
    match decode(bytes) {
        Ok(instr) => (format_instruction(&instr), instr.len()),
        Err(DecodeError::Truncated { opcode, .. }) => {
            (format!("??? ; truncated {:08b}", opcode), bytes.len().max(1))
        }
        Err(_) => ("???".to_string(), 1),
    }
}

/// Disassemble a whole program into a listing.
pub fn disassemble(program: &[u8]) -> String {
    let mut output = String::new();
    output.push_str("; LS-8 Disassembly\n");
    output.push_str("; -----------------\n\n");

    for (addr, text, raw) in listing(program) {
        let raw: Vec<String> = raw.iter().map(|b| format!("{:08b}", b)).collect();
        output.push_str(&format!("{:03}: {:<12} ; {}\n", addr, text, raw.join(" ")));
    }

    output
}

/// Walk `program` instruction by instruction, yielding
/// `(address, text, raw bytes)`.
pub fn listing(program: &[u8]) -> Vec<(usize, String, &[u8])> {
    let mut lines = Vec::new();
    let mut addr = 0;

    while addr < program.len() {
        let (text, len) = disassemble_instruction(&program[addr..]);
        let end = (addr + len).min(program.len());
        lines.push((addr, text, &program[addr..end]));
        addr = end;
    }

    lines
}

/// Format a decoded instruction as assembly text.
pub fn format_instruction(instr: &Instruction) -> String {
    let mnemonic = instr.opcode().mnemonic();
    match instr {
        Instruction::Hlt => mnemonic.to_string(),
        Instruction::Ldi { reg, value } => format!("{} R{},{}", mnemonic, reg, value),
        Instruction::Prn { reg } => format!("{} R{}", mnemonic, reg),
        Instruction::Mul { reg_a, reg_b } => format!("{} R{},R{}", mnemonic, reg_a, reg_b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MULT: [u8; 12] = [0x99, 0x00, 0x08, 0x99, 0x01, 0x09, 0xAA, 0x00, 0x01, 0x43, 0x00, 0x01];

    #[test]
    fn test_disassemble_instruction() {
        assert_eq!(disassemble_instruction(&[0x99, 0x00, 0x08]), ("LDI R0,8".to_string(), 3));
        assert_eq!(disassemble_instruction(&[0x43, 0x02]), ("PRN R2".to_string(), 2));
        assert_eq!(disassemble_instruction(&[0x01]), ("HLT".to_string(), 1));
        assert_eq!(disassemble_instruction(&[0x00, 0x99]), ("???".to_string(), 1));
    }

    #[test]
    fn test_listing_addresses() {
        let lines: Vec<(usize, String)> = listing(&MULT)
            .into_iter()
            .map(|(addr, text, _)| (addr, text))
            .collect();

        assert_eq!(
            lines,
            vec![
                (0, "LDI R0,8".to_string()),
                (3, "LDI R1,9".to_string()),
                (6, "MUL R0,R1".to_string()),
                (9, "PRN R0".to_string()),
                (11, "HLT".to_string()),
            ]
        );
    }

    #[test]
    fn test_truncated_tail() {
        let lines = listing(&[0x01, 0xAA, 0x00]);
        assert_eq!(lines.len(), 2);
        assert!(lines[1].1.starts_with("???"));
        assert_eq!(lines[1].2, &[0xAA, 0x00]);
    }

    #[test]
    fn test_disassemble_header_and_raw_bytes() {
        let text = disassemble(&MULT);
        assert!(text.starts_with("; LS-8 Disassembly"));
        assert!(text.contains("006: MUL R0,R1"));
        assert!(text.contains("; 10101010 00000000 00000001"));
    }
}
