//! Instruction decoding for the LS-8 instruction set.
//!
//! Opcode bytes are structured `AABCDDDD`: the top two bits give the operand
//! count, bit 5 marks ALU operations, bit 4 marks instructions that set the
//! program counter themselves, and the low four bits identify the
//! instruction. Instruction width is therefore `1 + (opcode >> 6)` bytes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One decoded LS-8 opcode.
///
/// Discriminants are the bit-exact instruction encodings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Opcode {
    /// End the run loop.
    Hlt = 0b0000_0001,
    /// reg[a] = immediate operand b.
    Ldi = 0b1000_0010,
    /// reg[a] = Memory[reg[b]].
    Ld = 0b1000_0011,
    /// Memory[reg[a]] = reg[b].
    St = 0b1000_0100,
    /// Print reg[a] as unsigned decimal.
    Prn = 0b0100_0111,
    /// Print the character whose code point is reg[a].
    Pra = 0b0100_1000,
    /// reg[a] = (reg[a] + reg[b]) mod 256.
    Add = 0b1010_0000,
    /// reg[a] = (reg[a] * reg[b]) mod 256.
    Mul = 0b1010_0010,
    /// reg[a] = (reg[a] + 1) mod 256.
    Inc = 0b0110_0101,
    /// reg[a] = (reg[a] - 1) mod 256.
    Dec = 0b0110_0110,
    /// Compare reg[a] to reg[b] and set the flag state.
    Cmp = 0b1010_0111,
    /// Push reg[a] onto the stack.
    Push = 0b0100_0101,
    /// Pop the top of the stack into reg[a].
    Pop = 0b0100_0110,
    /// Push the return address and jump to reg[a].
    Call = 0b0101_0000,
    /// Pop the return address into the program counter.
    Ret = 0b0001_0001,
    /// Jump to reg[a].
    Jmp = 0b0101_0100,
    /// Jump to reg[a] if the Equal flag is set.
    Jeq = 0b0101_0101,
    /// Jump to reg[a] if the Equal flag is clear.
    Jne = 0b0101_0110,
    /// Jump to reg[a] if the Greater flag is set.
    Jgt = 0b0101_0111,
    /// Jump to reg[a] if the Less flag is set.
    Jlt = 0b0101_1000,
    /// Jump to reg[a] if the Less or Equal flag is set.
    Jle = 0b0101_1001,
    /// Jump to reg[a] if the Greater or Equal flag is set.
    Jge = 0b0101_1010,
}

impl Opcode {
    /// Decode an opcode byte. Returns `None` for undefined encodings.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0b0000_0001 => Some(Self::Hlt),
            0b1000_0010 => Some(Self::Ldi),
            0b1000_0011 => Some(Self::Ld),
            0b1000_0100 => Some(Self::St),
            0b0100_0111 => Some(Self::Prn),
            0b0100_1000 => Some(Self::Pra),
            0b1010_0000 => Some(Self::Add),
            0b1010_0010 => Some(Self::Mul),
            0b0110_0101 => Some(Self::Inc),
            0b0110_0110 => Some(Self::Dec),
            0b1010_0111 => Some(Self::Cmp),
            0b0100_0101 => Some(Self::Push),
            0b0100_0110 => Some(Self::Pop),
            0b0101_0000 => Some(Self::Call),
            0b0001_0001 => Some(Self::Ret),
            0b0101_0100 => Some(Self::Jmp),
            0b0101_0101 => Some(Self::Jeq),
            0b0101_0110 => Some(Self::Jne),
            0b0101_0111 => Some(Self::Jgt),
            0b0101_1000 => Some(Self::Jlt),
            0b0101_1001 => Some(Self::Jle),
            0b0101_1010 => Some(Self::Jge),
            _ => None,
        }
    }

    /// Assembler mnemonic.
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Hlt => "HLT",
            Self::Ldi => "LDI",
            Self::Ld => "LD",
            Self::St => "ST",
            Self::Prn => "PRN",
            Self::Pra => "PRA",
            Self::Add => "ADD",
            Self::Mul => "MUL",
            Self::Inc => "INC",
            Self::Dec => "DEC",
            Self::Cmp => "CMP",
            Self::Push => "PUSH",
            Self::Pop => "POP",
            Self::Call => "CALL",
            Self::Ret => "RET",
            Self::Jmp => "JMP",
            Self::Jeq => "JEQ",
            Self::Jne => "JNE",
            Self::Jgt => "JGT",
            Self::Jlt => "JLT",
            Self::Jle => "JLE",
            Self::Jge => "JGE",
        }
    }

    /// Number of operand bytes, encoded in the top two bits of the opcode.
    #[inline]
    pub const fn operand_count(self) -> u8 {
        self as u8 >> 6
    }

    /// Instruction width in bytes: the opcode plus its operands.
    #[inline]
    pub const fn width(self) -> u8 {
        1 + self.operand_count()
    }
}

/// A decoded view of one to three consecutive memory bytes.
///
/// Both operand slots are always populated from the bytes following the
/// opcode, whether or not the opcode uses them (fixed-slot fetch).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub opcode: Opcode,
    /// First operand byte: a register index for every instruction that uses it.
    pub a: u8,
    /// Second operand byte: the immediate for LDI, a register index otherwise.
    pub b: u8,
}

impl Instruction {
    /// Instruction width in bytes.
    #[inline]
    pub fn width(&self) -> u8 {
        self.opcode.width()
    }
}

/// Renders in assembler-listing form: `LDI R0,8`, `ADD R0,R1`, `PRN R0`, `HLT`.
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mnemonic = self.opcode.mnemonic();
        match (self.opcode, self.opcode.operand_count()) {
            (Opcode::Ldi, _) => write!(f, "{} R{},{}", mnemonic, self.a, self.b),
            (_, 0) => f.write_str(mnemonic),
            (_, 1) => write!(f, "{} R{}", mnemonic, self.a),
            (_, _) => write!(f, "{} R{},R{}", mnemonic, self.a, self.b),
        }
    }
}
