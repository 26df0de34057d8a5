//! Program files and disassembly for the LS-8.
//!
//! This module provides:
//! - A loader for the text program format (binary literals, `#` comments)
//! - A disassembler (bytes → readable mnemonics)

pub mod disasm;
pub mod loader;

pub use disasm::{disassemble, disassemble_instruction};
pub use loader::{load_file, load_into, parse_program, LoadError};
