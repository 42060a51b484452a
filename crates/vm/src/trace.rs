//! Execution trace recording.
//!
//! Tracing is opt-in: the engine records one [`TraceRow`] per executed
//! instruction when enabled, and the whole run can be serialized for
//! post-mortem inspection.

use crate::alu::Cond;
use crate::decode::Opcode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One executed instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceRow {
    /// Step ordinal, starting at 0.
    pub step: u64,
    /// Program counter the instruction was fetched from.
    pub pc: u8,
    /// Decoded opcode.
    pub opcode: Opcode,
    /// First operand slot.
    pub a: u8,
    /// Second operand slot.
    pub b: u8,
    /// Register file before execution.
    pub regs: [u8; 8],
    /// Flag state after execution.
    pub cond: Option<Cond>,
}

/// Fixed-width hex line: `TRACE: PC | OP A B | R0 R1 R2 R3 R4 R5 R6 R7`.
impl fmt::Display for TraceRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TRACE: {:02X} | {:02X} {:02X} {:02X} |",
            self.pc, self.opcode as u8, self.a, self.b
        )?;
        for r in self.regs {
            write!(f, " {:02X}", r)?;
        }
        Ok(())
    }
}

/// A recorded execution: every step plus the final machine state.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionTrace {
    /// Rows in execution order.
    pub rows: Vec<TraceRow>,
    /// Program counter when recording stopped.
    pub final_pc: u8,
    /// Register file when recording stopped.
    pub final_regs: [u8; 8],
    /// Instructions executed while recording.
    pub steps: u64,
}

impl ExecutionTrace {
    /// Create an empty trace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> TraceRow {
        TraceRow {
            step: 0,
            pc: 0,
            opcode: Opcode::Ldi,
            a: 0,
            b: 8,
            regs: [0, 0, 0, 0, 0, 0, 0, 0xF4],
            cond: None,
        }
    }

    #[test]
    fn test_row_display_format() {
        assert_eq!(
            sample_row().to_string(),
            "TRACE: 00 | 82 00 08 | 00 00 00 00 00 00 00 F4"
        );
    }

    #[test]
    fn test_trace_len() {
        let mut trace = ExecutionTrace::new();
        assert!(trace.is_empty());
        trace.rows.push(sample_row());
        assert_eq!(trace.len(), 1);
    }

    #[test]
    fn test_trace_json_roundtrip() {
        let mut trace = ExecutionTrace::new();
        trace.rows.push(TraceRow {
            cond: Some(Cond::Greater),
            ..sample_row()
        });
        trace.final_pc = 3;
        trace.final_regs[0] = 8;
        trace.steps = 1;

        let json = serde_json::to_string(&trace).unwrap();
        let back: ExecutionTrace = serde_json::from_str(&json).unwrap();
        assert_eq!(back, trace);
    }
}
