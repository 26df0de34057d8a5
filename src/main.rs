//! LS-8 Emulator - CLI Entry Point
//!
//! Commands:
//! - `ls8 run <program>` - Load and run an LS-8 program
//! - `ls8 debug <program>` - Interactive debugger
//! - `ls8 disasm <program>` - Disassemble a program

use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use ls8::{EmulatorConfig, StdoutSink, StopReason};
use ls8::asm::{load_file, load_into};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ls8")]
#[command(version)]
#[command(about = "An emulator for the LS-8 8-bit teaching computer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a program until it halts
    Run {
        /// Path to the .ls8 program
        program: String,
        #[command(flatten)]
        machine: MachineArgs,
        /// Log every executed instruction and the registers to stderr
        #[arg(short, long)]
        trace: bool,
        /// Print the final CPU state as JSON
        #[arg(long)]
        dump_state: bool,
    },
    /// Interactive debugger
    Debug {
        /// Path to the .ls8 program
        program: String,
        #[command(flatten)]
        machine: MachineArgs,
    },
    /// Disassemble a program to readable text
    Disasm {
        /// Path to the .ls8 program
        program: String,
    },
}

#[derive(Args)]
struct MachineArgs {
    /// Clock rate in instructions per second
    #[arg(long, default_value = "1000")]
    hz: u32,
    /// Run as fast as possible, ignoring --hz
    #[arg(long)]
    unthrottled: bool,
    /// Stop after this many instructions
    #[arg(short, long)]
    max_cycles: Option<u64>,
    /// Memory size in bytes
    #[arg(long, default_value = "256")]
    memory_size: usize,
}

impl From<&MachineArgs> for EmulatorConfig {
    fn from(args: &MachineArgs) -> Self {
        Self {
            memory_size: args.memory_size,
            clock_hz: if args.unthrottled { 0 } else { args.hz },
            max_cycles: args.max_cycles,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter(&cli.command))),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Run { program, machine, dump_state, .. } => {
            run_program(&program, (&machine).into(), dump_state)
        }
        Commands::Debug { program, machine } => debug_program(&program, (&machine).into()),
        Commands::Disasm { program } => disassemble_file(&program),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {}", message);
            ExitCode::FAILURE
        }
    }
}

/// Log filter used when `RUST_LOG` is not set.
fn default_filter(command: &Commands) -> &'static str {
    match command {
        Commands::Run { trace: true, .. } => "trace",
        _ => "warn",
    }
}

fn run_program(path: &str, config: EmulatorConfig, dump_state: bool) -> Result<(), String> {
    let program = load_file(path).map_err(|e| e.to_string())?;
    if program.is_empty() {
        return Err(format!("{}: no instructions to execute", path));
    }

    let mut cpu = config.build_cpu();
    load_into(&mut cpu.mem, &program).map_err(|e| e.to_string())?;

    let result = config.build_clock().start(&mut cpu, &mut StdoutSink);

    if dump_state {
        let json = serde_json::to_string_pretty(&cpu).map_err(|e| e.to_string())?;
        println!("{}", json);
    }

    let summary = result.map_err(|e| format!("CPU fault: {}", e))?;
    if summary.reason == StopReason::CycleLimit {
        eprintln!(
            "warning: reached max cycles limit ({}); use --max-cycles to increase",
            summary.cycles
        );
    }

    Ok(())
}

#[cfg(feature = "tui")]
fn debug_program(path: &str, config: EmulatorConfig) -> Result<(), String> {
    let program = load_file(path).map_err(|e| e.to_string())?;
    ls8::run_debugger(program, config).map_err(|e| format!("debugger error: {}", e))
}

#[cfg(not(feature = "tui"))]
fn debug_program(_path: &str, _config: EmulatorConfig) -> Result<(), String> {
    Err("this build has no debugger; rebuild with the `tui` feature".into())
}

fn disassemble_file(path: &str) -> Result<(), String> {
    let program = load_file(path).map_err(|e| e.to_string())?;
    print!("{}", ls8::disassemble(&program));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    fn filter_for(args: &[&str]) -> EnvFilter {
        let cli = Cli::try_parse_from(args).unwrap();
        EnvFilter::new(default_filter(&cli.command))
    }

    #[test]
    fn test_trace_flag_enables_instruction_events() {
        let filter = filter_for(&["ls8", "run", "mult.ls8", "--trace"]);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
    }

    #[test]
    fn test_default_filter_is_warn() {
        assert_eq!(filter_for(&["ls8", "run", "mult.ls8"]).max_level_hint(), Some(LevelFilter::WARN));
        assert_eq!(filter_for(&["ls8", "disasm", "mult.ls8"]).max_level_hint(), Some(LevelFilter::WARN));
    }
}
