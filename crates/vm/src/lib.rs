//! LS-8 virtual machine core.
//!
//! An 8-bit register machine: 256 bytes of flat memory, eight byte-wide
//! registers (R7 doubles as the stack pointer), a descending stack, and a
//! fixed-slot fetch-decode-execute loop. Program images are
//! whitespace-separated binary-literal text, installed at address 0 and run
//! to a halt instruction.
//!
//! ```
//! use ls8_vm::{loader, Cpu};
//!
//! let image =
//!     loader::parse_image("10000010 00000000 00001000 01000111 00000000 00000001");
//! let mut cpu = Cpu::new();
//! cpu.load(&image).unwrap();
//! cpu.run().unwrap();
//! assert_eq!(cpu.take_output(), b"8\n");
//! ```

pub mod alu;
pub mod cpu;
pub mod decode;
pub mod error;
pub mod loader;
pub mod memory;
pub mod trace;

pub use alu::{AluOp, AluResult, Cond};
pub use cpu::{Control, Cpu, NUM_REGS, SP_INIT, SP_REG};
pub use decode::{Instruction, Opcode};
pub use error::VmError;
pub use memory::{Memory, MEM_SIZE};
pub use trace::{ExecutionTrace, TraceRow};
