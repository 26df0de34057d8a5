//! LS-8 program files.
//!
//! A program is plain text:
//! - One byte per line, written as up to 8 binary digits
//! - Everything from `#` to the end of the line is a comment
//! - Blank and comment-only lines are ignored
//!
//! Bytes are placed at consecutive addresses starting from 0.

use std::path::Path;

use crate::cpu::{Memory, MemoryError};
use thiserror::Error;
use tracing::debug;

/// Parse program text into the bytes it describes.
pub fn parse_program(source: &str) -> Result<Vec<u8>, LoadError> {
    let mut bytes = Vec::new();

    for (line_num, line) in source.lines().enumerate() {
        let code = match line.split_once('#') {
            Some((code, _comment)) => code,
            None => line,
        }
        .trim();

        if code.is_empty() {
            continue;
        }

        if code.len() > 8 || !code.chars().all(|c| c == '0' || c == '1') {
            return Err(LoadError::Parse {
                line: line_num + 1,
                message: format!("expected up to 8 binary digits, found {:?}", code),
            });
        }

        // Validated above: at most 8 binary digits always fit a byte
        let byte = u8::from_str_radix(code, 2).map_err(|e| LoadError::Parse {
            line: line_num + 1,
            message: e.to_string(),
        })?;
        bytes.push(byte);
    }

    Ok(bytes)
}

/// Read and parse a program file from disk.
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Vec<u8>, LoadError> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path)
        .map_err(|e| LoadError::Io(format!("{}: {}", path.display(), e)))?;
    let bytes = parse_program(&source)?;
    debug!(path = %path.display(), bytes = bytes.len(), "program parsed");
    Ok(bytes)
}

/// Write a parsed program into memory starting at address 0.
pub fn load_into(mem: &mut Memory, program: &[u8]) -> Result<(), LoadError> {
    mem.load_program(0, program)?;
    Ok(())
}

/// Errors that can occur while loading a program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("{0}")]
    Memory(#[from] MemoryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    const MULT_LS8: &str = "\
# mult.ls8
10011001 # LDI R0,8
00000000
00001000
10011001 # LDI R1,9
00000001
00001001

10101010 # MUL R0,R1
00000000
00000001
01000011 # PRN R0
00000000
00000001 # HLT
";

    #[test]
    fn test_parse_mult() {
        let bytes = parse_program(MULT_LS8).unwrap();
        assert_eq!(
            bytes,
            vec![0x99, 0x00, 0x08, 0x99, 0x01, 0x09, 0xAA, 0x00, 0x01, 0x43, 0x00, 0x01]
        );
    }

    #[test]
    fn test_comments_and_whitespace() {
        let bytes = parse_program("  # header\n\t101 \n#\n   \n1#trailing").unwrap();
        assert_eq!(bytes, vec![0b101, 1]);
    }

    #[test]
    fn test_rejects_non_binary() {
        let err = parse_program("00000001\n0000002\n").unwrap_err();
        match err {
            LoadError::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rejects_too_many_digits() {
        assert!(matches!(
            parse_program("100000000"),
            Err(LoadError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn test_load_into_memory() {
        let mut mem = Memory::new(4);
        load_into(&mut mem, &[1, 2]).unwrap();
        assert_eq!(mem.dump(0, 4), vec![(0, 1), (1, 2), (2, 0), (3, 0)]);

        let err = load_into(&mut mem, &[0; 5]).unwrap_err();
        assert_eq!(err, LoadError::Memory(MemoryError::ProgramTooLarge { size: 5, available: 4 }));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            load_file("/nonexistent/program.ls8"),
            Err(LoadError::Io(_))
        ));
    }
}
