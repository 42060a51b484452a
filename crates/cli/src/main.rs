//! ls8 CLI: run and disassemble LS-8 machine-code images.

use clap::{Parser, Subcommand};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use ls8_vm::{loader, Control, Cpu, Instruction, Opcode, VmError};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// ls8: LS-8 microcomputer emulator
#[derive(Parser)]
#[command(name = "ls8")]
#[command(version = "0.1.0")]
#[command(about = "Run and disassemble LS-8 machine-code images", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute an image until it halts
    Run {
        /// Path to the .ls8 image (one binary literal per instruction byte)
        program: PathBuf,

        /// Maximum instructions to execute before giving up
        #[arg(long, value_name = "NUM", default_value = "1000000")]
        max_steps: u64,

        /// Print the execution trace to stderr after the run
        #[arg(long)]
        trace: bool,

        /// Write the execution trace as JSON
        #[arg(long, value_name = "PATH")]
        trace_out: Option<PathBuf>,

        /// Write the final machine state as JSON
        #[arg(long, value_name = "PATH")]
        dump_state: Option<PathBuf>,
    },

    /// Print an assembler-style listing of an image
    Disasm {
        /// Path to the .ls8 image
        program: PathBuf,
    },
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ls8=info,ls8_vm=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            program,
            max_steps,
            trace,
            trace_out,
            dump_state,
        } => {
            run_command(
                &program,
                max_steps,
                trace,
                trace_out.as_ref(),
                dump_state.as_ref(),
            );
        }
        Commands::Disasm { program } => {
            disasm_command(&program);
        }
    }
}

/// Reads a source file and parses it into instruction bytes.
fn load_image(path: &PathBuf) -> Vec<u8> {
    let source = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading {}: {}", path.display(), e);
            std::process::exit(1);
        }
    };

    let image = loader::parse_image(&source);
    if image.is_empty() {
        eprintln!("Error: {} contains no instruction bytes", path.display());
        std::process::exit(1);
    }
    image
}

fn run_command(
    path: &PathBuf,
    max_steps: u64,
    trace: bool,
    trace_out: Option<&PathBuf>,
    dump_state: Option<&PathBuf>,
) {
    let image = load_image(path);

    let mut cpu = Cpu::new();
    if let Err(e) = cpu.load(&image) {
        eprintln!("Error loading {}: {}", path.display(), e);
        std::process::exit(1);
    }
    if trace || trace_out.is_some() {
        cpu.enable_tracing();
    }

    let start = Instant::now();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match run_bounded(&mut cpu, max_steps, &mut out) {
        Ok(true) => {
            debug!(steps = cpu.cycle, elapsed = ?start.elapsed(), "program halted");
        }
        Ok(false) => {
            report_trace(&mut cpu, trace, trace_out);
            eprintln!("Gave up after {} steps without reaching HLT", max_steps);
            std::process::exit(1);
        }
        Err(e) => {
            // The faulting step may have produced output before the fault.
            drain_output(&mut cpu, &mut out);
            report_trace(&mut cpu, trace, trace_out);
            eprintln!("Execution fault after {} steps: {}", cpu.cycle, e);
            std::process::exit(1);
        }
    }

    report_trace(&mut cpu, trace, trace_out);

    if let Some(out_path) = dump_state {
        let json = match serde_json::to_string_pretty(&cpu) {
            Ok(json) => json,
            Err(e) => {
                eprintln!("Error serializing state: {}", e);
                std::process::exit(1);
            }
        };
        if let Err(e) = fs::write(out_path, json) {
            eprintln!("Error writing state to {}: {}", out_path.display(), e);
            std::process::exit(1);
        }
    }
}

/// Steps the machine up to `max_steps` instructions, forwarding console
/// output as it appears. Returns whether the program halted.
fn run_bounded(cpu: &mut Cpu, max_steps: u64, out: &mut impl Write) -> Result<bool, VmError> {
    let mut steps = 0u64;
    while steps < max_steps {
        let control = cpu.step()?;
        steps += 1;
        drain_output(cpu, out);
        if control == Control::Halt {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Forwards whatever PRN/PRA produced since the last drain.
fn drain_output(cpu: &mut Cpu, out: &mut impl Write) {
    let bytes = cpu.take_output();
    if bytes.is_empty() {
        return;
    }
    if let Err(e) = out.write_all(&bytes).and_then(|()| out.flush()) {
        eprintln!("Error writing program output: {}", e);
        std::process::exit(1);
    }
}

fn report_trace(cpu: &mut Cpu, print: bool, trace_out: Option<&PathBuf>) {
    if let Some(trace) = cpu.take_trace() {
        if print {
            for row in &trace.rows {
                eprintln!("{}", row);
            }
        }

        if let Some(path) = trace_out {
            let json = match serde_json::to_string_pretty(&trace) {
                Ok(json) => json,
                Err(e) => {
                    eprintln!("Error serializing trace: {}", e);
                    std::process::exit(1);
                }
            };
            if let Err(e) = fs::write(path, json) {
                eprintln!("Error writing trace to {}: {}", path.display(), e);
                std::process::exit(1);
            }
        }
    }
}

fn disasm_command(path: &PathBuf) {
    let image = load_image(path);
    for line in listing(&image) {
        println!("{}", line);
    }
}

/// Renders one line per instruction: address, raw bytes, assembler form.
/// Bytes that are not defined opcodes, or opcodes whose operand bytes run
/// past the end of the image, are listed as data.
fn listing(image: &[u8]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut pc = 0usize;
    while pc < image.len() {
        let byte = image[pc];
        match Opcode::from_byte(byte) {
            Some(opcode) if pc + opcode.width() as usize <= image.len() => {
                let width = opcode.width() as usize;
                let a = if width > 1 { image[pc + 1] } else { 0 };
                let b = if width > 2 { image[pc + 2] } else { 0 };
                let instr = Instruction { opcode, a, b };

                let mut bytes = format!("{:02X}", byte);
                for offset in 1..width {
                    bytes.push_str(&format!(" {:02X}", image[pc + offset]));
                }
                lines.push(format!("{:02X}: {:<8}  {}", pc, bytes, instr));
                pc += width;
            }
            _ => {
                let bytes = format!("{:02X}", byte);
                lines.push(format!("{:02X}: {:<8}  .DB {:#010b}", pc, bytes, byte));
                pc += 1;
            }
        }
    }
    lines
}
