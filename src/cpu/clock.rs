//! Clock driver.
//!
//! The clock owns the pacing of the machine: it calls [`Cpu::tick`] once
//! per interval until the CPU halts. Nothing about it is global, so a CPU
//! can equally be single-stepped by hand with no clock at all.

use std::ops::ControlFlow;
use std::thread;
use std::time::{Duration, Instant};

use crate::cpu::{Cpu, CpuError, CpuState, Instruction};
use crate::cpu::output::OutputSink;
use serde::{Serialize, Deserialize};
use tracing::debug;

/// Reference clock rate: one instruction per millisecond.
pub const REFERENCE_HZ: u32 = 1_000;

/// Why a clocked run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// The CPU executed HLT.
    Halted,
    /// The configured cycle limit was reached with the CPU still running.
    CycleLimit,
    /// A step hook asked the clock to stop.
    Stopped,
}

/// Result of a completed clocked run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub cycles: u64,
    pub state: CpuState,
    pub reason: StopReason,
}

#[derive(Debug, Clone)]
pub struct Clock {
    interval: Option<Duration>,
    max_cycles: Option<u64>,
}

impl Clock {
    /// A clock that ticks once every `interval`.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: Some(interval),
            max_cycles: None,
        }
    }

    /// A clock running at `hz` ticks per second; `0` means unthrottled.
    pub fn from_hz(hz: u32) -> Self {
        if hz == 0 {
            Self::unthrottled()
        } else {
            Self::new(Duration::from_secs(1) / hz)
        }
    }

    /// A clock that ticks as fast as the host allows.
    pub fn unthrottled() -> Self {
        Self {
            interval: None,
            max_cycles: None,
        }
    }

    /// Stop after `max_cycles` instructions even if the CPU has not halted.
    pub fn with_max_cycles(mut self, max_cycles: Option<u64>) -> Self {
        self.max_cycles = max_cycles;
        self
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    /// Run `cpu` until it halts.
    pub fn start(&mut self, cpu: &mut Cpu, out: &mut impl OutputSink) -> Result<RunSummary, CpuError> {
        self.start_with(cpu, out, |_, _| ControlFlow::Continue(()))
    }

    /// Run `cpu` until it halts, calling `on_step` after every instruction.
    ///
    /// Returning `ControlFlow::Break` from the hook stops the clock and
    /// leaves the CPU running, so the run can be resumed later.
    pub fn start_with<F>(
        &mut self,
        cpu: &mut Cpu,
        out: &mut impl OutputSink,
        mut on_step: F,
    ) -> Result<RunSummary, CpuError>
    where
        F: FnMut(&Cpu, &Instruction) -> ControlFlow<()>,
    {
        let start_cycles = cpu.cycles;
        let mut next_tick = Instant::now();
        debug!(interval = ?self.interval, max_cycles = ?self.max_cycles, "clock started");

        let reason = loop {
            if !cpu.is_running() {
                break StopReason::Halted;
            }
            if let Some(limit) = self.max_cycles {
                if cpu.cycles - start_cycles >= limit {
                    break StopReason::CycleLimit;
                }
            }

            let instr = cpu.tick(out)?;

            if on_step(&*cpu, &instr).is_break() {
                break StopReason::Stopped;
            }

            if let Some(interval) = self.interval {
                next_tick += interval;
                let now = Instant::now();
                if next_tick > now {
                    thread::sleep(next_tick - now);
                }
            }
        };

        let summary = RunSummary {
            cycles: cpu.cycles - start_cycles,
            state: cpu.state,
            reason,
        };
        debug!(?summary, "clock stopped");
        Ok(summary)
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::from_hz(REFERENCE_HZ)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::Memory;

    // LDI R0,8; LDI R1,9; MUL R0,R1; PRN R0; HLT
    const MULT: [u8; 12] = [0x99, 0x00, 0x08, 0x99, 0x01, 0x09, 0xAA, 0x00, 0x01, 0x43, 0x00, 0x01];

    fn loaded(program: &[u8]) -> Cpu {
        let mut mem = Memory::default();
        mem.load_program(0, program).unwrap();
        Cpu::new(mem)
    }

    #[test]
    fn test_from_hz() {
        assert_eq!(Clock::from_hz(1000).interval(), Some(Duration::from_millis(1)));
        assert_eq!(Clock::from_hz(0).interval(), None);
        assert_eq!(Clock::default().interval(), Some(Duration::from_millis(1)));
    }

    #[test]
    fn test_runs_until_halt() {
        let mut cpu = loaded(&MULT);
        let mut out: Vec<u8> = Vec::new();
        let mut clock = Clock::unthrottled();

        let summary = clock.start(&mut cpu, &mut out).unwrap();

        assert_eq!(summary, RunSummary { cycles: 5, state: CpuState::Halted, reason: StopReason::Halted });
        assert_eq!(out, vec![72]);
    }

    #[test]
    fn test_paced_run_takes_interval_per_tick() {
        let mut cpu = loaded(&MULT);
        let mut out: Vec<u8> = Vec::new();
        let mut clock = Clock::new(Duration::from_millis(2));

        let started = Instant::now();
        clock.start(&mut cpu, &mut out).unwrap();

        assert!(started.elapsed() >= Duration::from_millis(10));
    }

    #[test]
    fn test_cycle_limit() {
        let mut cpu = loaded(&MULT);
        let mut out: Vec<u8> = Vec::new();
        let mut clock = Clock::unthrottled().with_max_cycles(Some(2));

        let summary = clock.start(&mut cpu, &mut out).unwrap();

        assert_eq!(summary.reason, StopReason::CycleLimit);
        assert_eq!(summary.cycles, 2);
        assert!(cpu.is_running());
        assert_eq!(cpu.regs.pc, 6);
    }

    #[test]
    fn test_hook_can_stop() {
        let mut cpu = loaded(&MULT);
        let mut out: Vec<u8> = Vec::new();
        let mut clock = Clock::unthrottled();

        let summary = clock
            .start_with(&mut cpu, &mut out, |_, instr| {
                if matches!(instr, Instruction::Mul { .. }) {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })
            .unwrap();

        assert_eq!(summary.reason, StopReason::Stopped);
        assert_eq!(cpu.regs.gp[0], 72);
        assert!(out.is_empty());

        // Resume
        let summary = clock.start(&mut cpu, &mut out).unwrap();
        assert_eq!(summary.reason, StopReason::Halted);
        assert_eq!(out, vec![72]);
    }

    #[test]
    fn test_fault_stops_clock() {
        let mut cpu = loaded(&[0b0000_0000]);
        let mut out: Vec<u8> = Vec::new();
        let mut clock = Clock::unthrottled();

        let err = clock.start(&mut cpu, &mut out).unwrap_err();

        assert_eq!(err, CpuError::UnknownInstruction { opcode: 0, pc: 0 });
        assert!(cpu.is_halted());
    }

    #[test]
    fn test_start_on_halted_cpu_is_noop() {
        let mut cpu = loaded(&MULT);
        let mut out: Vec<u8> = Vec::new();
        let mut clock = Clock::unthrottled();
        clock.start(&mut cpu, &mut out).unwrap();
        let pc = cpu.regs.pc;

        let summary = clock.start(&mut cpu, &mut out).unwrap();

        assert_eq!(summary.cycles, 0);
        assert_eq!(cpu.regs.pc, pc);
        assert_eq!(out, vec![72]);
    }
}
