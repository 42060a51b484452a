//! The LS-8 execution engine.
//!
//! One [`Cpu`] value owns all machine state: 256 bytes of memory, eight
//! byte-wide registers (R7 doubles as the stack pointer), the program
//! counter, and the comparison flag. [`Cpu::step`] performs one
//! fetch-decode-execute cycle; [`Cpu::run`] loops until the halt
//! instruction executes or a fault propagates.

use crate::alu::{self, AluOp, AluResult, Cond};
use crate::decode::{Instruction, Opcode};
use crate::error::VmError;
use crate::memory::Memory;
use crate::trace::{ExecutionTrace, TraceRow};
use serde::{Deserialize, Serialize};

/// Number of general-purpose registers.
pub const NUM_REGS: usize = 8;

/// Register conventionally reserved as the stack pointer.
pub const SP_REG: usize = 7;

/// Stack pointer reset value: the address just below the top of installed
/// program space. The stack grows downward from here; SP at this value
/// means the stack is logically empty.
pub const SP_INIT: u8 = 0xF4;

/// What the engine should do after an instruction executes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    /// Advance the program counter by the instruction width.
    Advance,
    /// The instruction set the program counter itself.
    Jump(u8),
    /// The halt instruction executed; the run loop ends.
    Halt,
}

/// LS-8 CPU state and execution engine.
#[derive(Clone, Serialize, Deserialize)]
pub struct Cpu {
    /// General-purpose registers R0..R7. R7 is the stack pointer.
    pub regs: [u8; NUM_REGS],
    /// Program counter: address of the next instruction byte.
    pub pc: u8,
    /// Instructions executed so far.
    pub cycle: u64,
    /// Memory subsystem.
    pub memory: Memory,
    /// Outcome of the most recent CMP; `None` before the first comparison.
    cond: Option<Cond>,
    /// Console bytes produced by PRN/PRA, drained by the host.
    output: Vec<u8>,
    /// Execution trace (if enabled).
    trace: Option<ExecutionTrace>,
    /// Whether tracing is enabled.
    tracing: bool,
}

impl Cpu {
    /// Create a CPU in its reset state: zeroed memory and registers,
    /// PC at 0, stack pointer at [`SP_INIT`].
    pub fn new() -> Self {
        let mut regs = [0; NUM_REGS];
        regs[SP_REG] = SP_INIT;
        Self {
            regs,
            pc: 0,
            cycle: 0,
            memory: Memory::new(),
            cond: None,
            output: Vec::new(),
            trace: None,
            tracing: false,
        }
    }

    /// Install a program image into memory starting at address 0.
    pub fn load(&mut self, image: &[u8]) -> Result<(), VmError> {
        self.memory.load(image)
    }

    /// Read register `index`.
    #[inline]
    pub fn reg(&self, index: u8) -> Result<u8, VmError> {
        if (index as usize) < NUM_REGS {
            Ok(self.regs[index as usize])
        } else {
            Err(VmError::RegisterOutOfRange {
                index,
                pc: self.pc,
            })
        }
    }

    /// Write register `index`.
    #[inline]
    pub fn set_reg(&mut self, index: u8, value: u8) -> Result<(), VmError> {
        if (index as usize) < NUM_REGS {
            self.regs[index as usize] = value;
            Ok(())
        } else {
            Err(VmError::RegisterOutOfRange {
                index,
                pc: self.pc,
            })
        }
    }

    /// Current stack pointer (the contents of R7).
    #[inline]
    pub fn sp(&self) -> u8 {
        self.regs[SP_REG]
    }

    /// Current flag state.
    #[inline]
    pub fn cond(&self) -> Option<Cond> {
        self.cond
    }

    /// Begin recording an execution trace.
    pub fn enable_tracing(&mut self) {
        self.tracing = true;
        self.trace = Some(ExecutionTrace::new());
    }

    /// Stop recording and return the trace collected so far, stamped with
    /// the final machine state.
    pub fn take_trace(&mut self) -> Option<ExecutionTrace> {
        self.tracing = false;
        let mut trace = self.trace.take()?;
        trace.final_pc = self.pc;
        trace.final_regs = self.regs;
        trace.steps = self.cycle;
        Some(trace)
    }

    /// Drain the console output buffer.
    pub fn take_output(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.output)
    }

    /// Console output accumulated since the last drain.
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Run until the halt instruction executes.
    pub fn run(&mut self) -> Result<(), VmError> {
        loop {
            if let Control::Halt = self.step()? {
                return Ok(());
            }
        }
    }

    /// Execute one fetch-decode-execute cycle.
    ///
    /// Returns the control outcome so callers can drive their own loop;
    /// stepping again after [`Control::Halt`] re-executes the halt.
    pub fn step(&mut self) -> Result<Control, VmError> {
        let instr = self.fetch()?;
        let mut row = self.tracing.then(|| TraceRow {
            step: self.cycle,
            pc: self.pc,
            opcode: instr.opcode,
            a: instr.a,
            b: instr.b,
            regs: self.regs,
            cond: self.cond,
        });

        let control = self.execute(instr)?;
        match control {
            Control::Advance => {
                self.pc = self
                    .pc
                    .checked_add(instr.width())
                    .ok_or(VmError::PcOutOfRange { pc: self.pc })?;
            }
            Control::Jump(target) => self.pc = target,
            Control::Halt => {}
        }
        self.cycle += 1;

        if let Some(row) = row.as_mut() {
            row.cond = self.cond;
        }
        if let (Some(trace), Some(row)) = (self.trace.as_mut(), row) {
            trace.rows.push(row);
        }
        Ok(control)
    }

    /// Fixed-slot instruction fetch: the opcode byte at PC plus both
    /// operand slots at PC+1 and PC+2, read whether or not the opcode
    /// uses them.
    fn fetch(&self) -> Result<Instruction, VmError> {
        let pc = self.pc;
        let opcode_byte = self.memory.read(pc);
        let slot_a = pc.checked_add(1).ok_or(VmError::FetchOutOfRange { pc })?;
        let slot_b = pc.checked_add(2).ok_or(VmError::FetchOutOfRange { pc })?;
        let a = self.memory.read(slot_a);
        let b = self.memory.read(slot_b);
        let opcode = Opcode::from_byte(opcode_byte).ok_or(VmError::UndefinedOpcode {
            opcode: opcode_byte,
            pc,
        })?;
        Ok(Instruction { opcode, a, b })
    }

    /// Dispatch one decoded instruction.
    fn execute(&mut self, instr: Instruction) -> Result<Control, VmError> {
        match instr.opcode {
            Opcode::Hlt => Ok(Control::Halt),
            Opcode::Ldi => {
                self.set_reg(instr.a, instr.b)?;
                Ok(Control::Advance)
            }
            Opcode::Ld => {
                let addr = self.reg(instr.b)?;
                let value = self.memory.read(addr);
                self.set_reg(instr.a, value)?;
                Ok(Control::Advance)
            }
            Opcode::St => {
                let addr = self.reg(instr.a)?;
                let value = self.reg(instr.b)?;
                self.memory.write(addr, value);
                Ok(Control::Advance)
            }
            Opcode::Prn => {
                let value = self.reg(instr.a)?;
                self.output.extend_from_slice(value.to_string().as_bytes());
                self.output.push(b'\n');
                Ok(Control::Advance)
            }
            Opcode::Pra => {
                let value = self.reg(instr.a)?;
                let mut buf = [0u8; 4];
                self.output
                    .extend_from_slice(char::from(value).encode_utf8(&mut buf).as_bytes());
                Ok(Control::Advance)
            }
            Opcode::Add => self.alu_instr(AluOp::Add, instr),
            Opcode::Mul => self.alu_instr(AluOp::Mul, instr),
            Opcode::Inc => self.alu_instr(AluOp::Inc, instr),
            Opcode::Dec => self.alu_instr(AluOp::Dec, instr),
            Opcode::Cmp => self.alu_instr(AluOp::Cmp, instr),
            Opcode::Push => {
                let value = self.reg(instr.a)?;
                self.push(value)?;
                Ok(Control::Advance)
            }
            Opcode::Pop => {
                let value = self.pop()?;
                self.set_reg(instr.a, value)?;
                Ok(Control::Advance)
            }
            Opcode::Call => {
                let target = self.reg(instr.a)?;
                // Return address is the byte after this two-byte CALL;
                // fetch already verified pc+2 is addressable.
                let ret = self.pc + 2;
                self.push(ret)?;
                Ok(Control::Jump(target))
            }
            Opcode::Ret => {
                let target = self.pop()?;
                Ok(Control::Jump(target))
            }
            Opcode::Jmp => {
                let target = self.reg(instr.a)?;
                Ok(Control::Jump(target))
            }
            Opcode::Jeq => self.branch(matches!(self.cond, Some(Cond::Equal)), instr.a),
            Opcode::Jne => self.branch(!matches!(self.cond, Some(Cond::Equal)), instr.a),
            Opcode::Jgt => self.branch(matches!(self.cond, Some(Cond::Greater)), instr.a),
            Opcode::Jlt => self.branch(matches!(self.cond, Some(Cond::Less)), instr.a),
            Opcode::Jle => self.branch(
                matches!(self.cond, Some(Cond::Less | Cond::Equal)),
                instr.a,
            ),
            Opcode::Jge => self.branch(
                matches!(self.cond, Some(Cond::Greater | Cond::Equal)),
                instr.a,
            ),
        }
    }

    /// ALU instructions: read the operand registers, evaluate, write the
    /// value back or record the comparison. Unary operations never touch
    /// the second operand slot (it belongs to the next instruction).
    fn alu_instr(&mut self, op: AluOp, instr: Instruction) -> Result<Control, VmError> {
        let a = self.reg(instr.a)?;
        let b = match op {
            AluOp::Add | AluOp::Mul | AluOp::Cmp => self.reg(instr.b)?,
            AluOp::Inc | AluOp::Dec => 0,
        };
        match alu::eval(op, a, b) {
            AluResult::Value(value) => self.set_reg(instr.a, value)?,
            AluResult::Compare(cond) => self.cond = Some(cond),
        }
        Ok(Control::Advance)
    }

    /// Conditional jump: read the target register only when taken, so a
    /// not-taken branch never faults on its operand.
    fn branch(&mut self, taken: bool, target_reg: u8) -> Result<Control, VmError> {
        if taken {
            Ok(Control::Jump(self.reg(target_reg)?))
        } else {
            Ok(Control::Advance)
        }
    }

    /// Decrement SP and write `value` at the new top of stack.
    fn push(&mut self, value: u8) -> Result<(), VmError> {
        let sp = self.sp();
        let new_sp = sp.checked_sub(1).ok_or(VmError::StackOverflow {
            sp,
            pc: self.pc,
        })?;
        self.memory.write(new_sp, value);
        self.regs[SP_REG] = new_sp;
        Ok(())
    }

    /// Read the top of stack and increment SP. Reading an empty stack
    /// returns whatever byte is resident at SP (no occupancy tracking).
    fn pop(&mut self) -> Result<u8, VmError> {
        let sp = self.sp();
        let value = self.memory.read(sp);
        let new_sp = sp.checked_add(1).ok_or(VmError::StackUnderflow {
            sp,
            pc: self.pc,
        })?;
        self.regs[SP_REG] = new_sp;
        Ok(value)
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}
