//! Debugger application state and logic.

use crate::{Cpu, EmulatorConfig};
use crate::asm::disasm::{disassemble_instruction, format_instruction};
use crate::cpu::memory::MemoryError;
use std::collections::HashSet;

/// Bytes shown per row of the memory view.
pub const BYTES_PER_ROW: usize = 16;

/// Debugger application state.
pub struct DebuggerApp {
    /// The CPU being debugged.
    pub cpu: Cpu,
    /// Original program for reference.
    pub program: Vec<u8>,
    /// Values printed by PRN so far.
    pub output: Vec<u8>,
    /// Breakpoints (by address).
    pub breakpoints: HashSet<usize>,
    /// Is the debugger running continuously?
    pub running: bool,
    /// Should we quit?
    pub should_quit: bool,
    /// Status message to display.
    pub status: String,
    /// Memory view scroll offset, in rows.
    pub mem_scroll: usize,
    /// Breakpoint address the current run started on, if any.
    resume_from: Option<usize>,
    config: EmulatorConfig,
}

impl DebuggerApp {
    /// Create a new debugger with a loaded program.
    ///
    /// Fails if the program does not fit in the configured memory.
    pub fn new(program: Vec<u8>, config: EmulatorConfig) -> Result<Self, MemoryError> {
        let mut cpu = config.build_cpu();
        cpu.load_program(&program)?;

        Ok(Self {
            cpu,
            program,
            output: Vec::new(),
            breakpoints: HashSet::new(),
            running: false,
            should_quit: false,
            status: "Ready. Press 's' to step, 'r' to run, 'q' to quit.".into(),
            mem_scroll: 0,
            resume_from: None,
            config,
        })
    }

    /// Step one instruction.
    pub fn step(&mut self) {
        if !self.cpu.is_running() {
            self.status = format!("CPU halted after {} cycles", self.cpu.cycles);
            self.running = false;
            return;
        }

        let pc = self.cpu.regs.pc;
        match self.cpu.tick(&mut self.output) {
            Ok(instr) => {
                let text = format_instruction(&instr);
                self.status = format!("PC={:03}: {}", pc, text);
            }
            Err(e) => {
                self.status = format!("Error: {}", e);
                self.running = false;
            }
        }
    }

    /// Run until halt, breakpoint, or error.
    pub fn run(&mut self) {
        self.running = true;
        self.resume_from = Some(self.cpu.regs.pc);
        self.status = "Running...".into();
    }

    /// Run one iteration of continuous execution.
    pub fn tick(&mut self) {
        if !self.running {
            return;
        }

        if !self.cpu.is_running() {
            self.running = false;
            self.status = format!("Halted after {} cycles", self.cpu.cycles);
            return;
        }

        if let Some(limit) = self.config.max_cycles {
            if self.cpu.cycles >= limit {
                self.running = false;
                self.status = format!("Cycle limit ({}) reached", limit);
                return;
            }
        }

        // Check for breakpoint
        let pc = self.cpu.regs.pc;
        if self.breakpoints.contains(&pc) && self.resume_from != Some(pc) {
            self.running = false;
            self.status = format!("Breakpoint at PC={}", pc);
            return;
        }

        self.resume_from = None;
        self.step();
    }

    /// Toggle breakpoint at current PC.
    pub fn toggle_breakpoint(&mut self) {
        let pc = self.cpu.regs.pc;
        if self.breakpoints.remove(&pc) {
            self.status = format!("Removed breakpoint at PC={}", pc);
        } else {
            self.breakpoints.insert(pc);
            self.status = format!("Set breakpoint at PC={}", pc);
        }
    }

    /// Reset CPU to initial state with the program reloaded.
    pub fn reset(&mut self) {
        self.cpu = self.config.build_cpu();
        if let Err(e) = self.cpu.load_program(&self.program) {
            self.status = format!("Error: {}", e);
        } else {
            self.status = "Reset. Ready.".into();
        }
        self.output.clear();
        self.running = false;
    }

    pub fn scroll_up(&mut self) {
        self.mem_scroll = self.mem_scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        let rows = self.cpu.mem.capacity().div_ceil(BYTES_PER_ROW);
        if self.mem_scroll + 1 < rows {
            self.mem_scroll += 1;
        }
    }

    /// Get disassembly starting at the current PC.
    pub fn get_disassembly(&self, lines: usize) -> Vec<(usize, String, bool)> {
        let pc = self.cpu.regs.pc;
        let bytes = self.cpu.mem.as_bytes();
        let mut result = Vec::with_capacity(lines);
        let mut addr = pc;

        while result.len() < lines && addr < bytes.len() {
            let (text, len) = disassemble_instruction(&bytes[addr..]);
            result.push((addr, text, addr == pc));
            addr += len;
        }

        result
    }
}

/// Run the debugger with a program.
pub fn run_debugger(program: Vec<u8>, config: EmulatorConfig) -> std::io::Result<()> {
    use crossterm::{
        event::{self, Event, KeyCode, KeyEventKind},
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
        ExecutableCommand,
    };
    use ratatui::prelude::*;
    use std::io::stdout;
    use std::time::Duration;

    let tick_interval = config.build_clock().interval().unwrap_or(Duration::ZERO);

    // Load before touching the terminal so a bad program is reported plainly
    let mut app = DebuggerApp::new(program, config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    // Main loop
    loop {
        // Draw
        terminal.draw(|frame| {
            super::ui::draw(frame, &app);
        })?;

        // Handle input; while running, poll at the clock rate
        let timeout = if app.running { tick_interval } else { Duration::from_millis(50) };
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') => app.should_quit = true,
                        KeyCode::Char('s') => {
                            app.running = false;
                            app.step();
                        }
                        KeyCode::Char('r') => app.run(),
                        KeyCode::Char('p') => {
                            app.running = false;
                            app.status = "Paused.".into();
                        }
                        KeyCode::Char('b') => app.toggle_breakpoint(),
                        KeyCode::Char('x') => app.reset(),
                        KeyCode::Up => app.scroll_up(),
                        KeyCode::Down => app.scroll_down(),
                        _ => {}
                    }
                }
            }
        }

        // Tick for continuous running
        if app.running {
            app.tick();
        }

        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MULT: [u8; 12] = [0x99, 0x00, 0x08, 0x99, 0x01, 0x09, 0xAA, 0x00, 0x01, 0x43, 0x00, 0x01];

    fn app() -> DebuggerApp {
        DebuggerApp::new(MULT.to_vec(), EmulatorConfig::default()).unwrap()
    }

    #[test]
    fn test_program_too_large_for_memory() {
        let config = EmulatorConfig { memory_size: 4, ..EmulatorConfig::default() };
        let program = vec![0x99, 0x00, 0x08, 0x43, 0x00, 0x01];

        let err = DebuggerApp::new(program, config).err().unwrap();

        assert_eq!(err, MemoryError::ProgramTooLarge { size: 6, available: 4 });
    }

    #[test]
    fn test_new_app_is_ready() {
        let app = app();
        assert!(app.status.starts_with("Ready."));
        assert_eq!(app.cpu.mem.read(0).unwrap(), 0x99);
    }

    #[test]
    fn test_step_updates_status() {
        let mut app = app();
        app.step();
        assert_eq!(app.status, "PC=000: LDI R0,8");
        assert_eq!(app.cpu.regs.pc, 3);
    }

    #[test]
    fn test_run_to_halt_collects_output() {
        let mut app = app();
        app.run();
        for _ in 0..10 {
            app.tick();
        }
        assert!(!app.running);
        assert!(app.cpu.is_halted());
        assert_eq!(app.output, vec![72]);
    }

    #[test]
    fn test_breakpoint_pauses_then_resumes() {
        let mut app = app();
        app.step();
        app.step();
        // PC is now on MUL
        app.toggle_breakpoint();
        app.cpu.reset();

        app.run();
        while app.running {
            app.tick();
        }
        assert_eq!(app.status, "Breakpoint at PC=6");
        assert_eq!(app.cpu.regs.pc, 6);
        assert!(app.output.is_empty());

        app.run();
        while app.running {
            app.tick();
        }
        assert!(app.cpu.is_halted());
        assert_eq!(app.output, vec![72]);
    }

    #[test]
    fn test_reset_reloads_program() {
        let mut app = app();
        app.run();
        while app.running {
            app.tick();
        }
        app.reset();
        assert!(app.cpu.is_running());
        assert!(app.output.is_empty());
        assert_eq!(app.cpu.mem.read(0).unwrap(), 0x99);
    }

    #[test]
    fn test_disassembly_from_pc() {
        let app = app();
        let lines = app.get_disassembly(3);
        assert_eq!(lines[0], (0, "LDI R0,8".to_string(), true));
        assert_eq!(lines[2], (6, "MUL R0,R1".to_string(), false));
    }
}
