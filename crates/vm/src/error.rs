//! Error types for the virtual machine.

use thiserror::Error;

/// Errors that can occur while loading or executing a program.
///
/// Every variant is fatal: execution stops at the faulting instruction and
/// nothing is retried.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum VmError {
    /// The byte at the program counter is not a defined opcode.
    #[error("Undefined opcode {opcode:#010b} at pc={pc:#04x}")]
    UndefinedOpcode { opcode: u8, pc: u8 },

    /// An operand byte was used as a register index outside [0, 7].
    #[error("Register index {index} out of range at pc={pc:#04x}")]
    RegisterOutOfRange { index: u8, pc: u8 },

    /// The instruction at `pc` extends past the end of memory, so its
    /// operand slots cannot be read.
    #[error("Instruction fetch at pc={pc:#04x} extends past end of memory")]
    FetchOutOfRange { pc: u8 },

    /// Advancing past the instruction at `pc` would move the program
    /// counter beyond the last memory address.
    #[error("Program counter advanced past end of memory (instruction at pc={pc:#04x})")]
    PcOutOfRange { pc: u8 },

    /// A push would decrement the stack pointer below address 0.
    #[error("Stack overflow at pc={pc:#04x} (sp={sp:#04x})")]
    StackOverflow { sp: u8, pc: u8 },

    /// A pop would increment the stack pointer past the last memory address.
    #[error("Stack underflow at pc={pc:#04x} (sp={sp:#04x})")]
    StackUnderflow { sp: u8, pc: u8 },

    /// The program image does not fit in the 256-byte memory.
    #[error("Program image of {len} bytes exceeds memory size of 256")]
    ProgramTooLarge { len: usize },
}
