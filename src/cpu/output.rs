//! Output channel for the PRN instruction.

use std::io::{self, Write};

/// Append-only, ordered destination for printed register values.
///
/// A failed write is a CPU fault: the machine halts on the PRN that
/// could not be delivered.
pub trait OutputSink {
    fn emit(&mut self, value: u8) -> io::Result<()>;
}

/// Collects values in memory; used by tests and the debugger.
impl OutputSink for Vec<u8> {
    fn emit(&mut self, value: u8) -> io::Result<()> {
        self.push(value);
        Ok(())
    }
}

/// Prints each value in decimal on its own line on standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn emit(&mut self, value: u8) -> io::Result<()> {
        let mut lock = io::stdout().lock();
        writeln!(lock, "{}", value)?;
        lock.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_sink_preserves_order() {
        let mut out: Vec<u8> = Vec::new();
        for v in [3, 1, 2] {
            out.emit(v).unwrap();
        }
        assert_eq!(out, vec![3, 1, 2]);
    }
}
