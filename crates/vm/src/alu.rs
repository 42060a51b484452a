//! Arithmetic/logic unit.
//!
//! Pure value-level operations: the engine reads the operand registers,
//! calls [`eval`], and writes the value back or records the comparison. The
//! ALU knows nothing about the fetch cycle or the register file.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// ALU operation tag.
///
/// A closed set: dispatch over it is exhaustive, so an unsupported operation
/// cannot be expressed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AluOp {
    Add,
    Mul,
    Inc,
    Dec,
    Cmp,
}

/// Outcome of the most recent comparison.
///
/// Exactly one outcome holds at a time; the engine keeps `Option<Cond>`,
/// `None` until the first comparison executes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cond {
    Equal,
    Less,
    Greater,
}

impl From<Ordering> for Cond {
    fn from(ord: Ordering) -> Self {
        match ord {
            Ordering::Equal => Cond::Equal,
            Ordering::Less => Cond::Less,
            Ordering::Greater => Cond::Greater,
        }
    }
}

/// Result of an ALU operation: a value for the destination register, or a
/// comparison verdict for the flag state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AluResult {
    Value(u8),
    Compare(Cond),
}

/// Evaluate one ALU operation over byte values.
///
/// Arithmetic wraps modulo 256; comparison is unsigned. Unary operations
/// (INC/DEC) ignore `b`.
pub fn eval(op: AluOp, a: u8, b: u8) -> AluResult {
    match op {
        AluOp::Add => AluResult::Value(a.wrapping_add(b)),
        AluOp::Mul => AluResult::Value(a.wrapping_mul(b)),
        AluOp::Inc => AluResult::Value(a.wrapping_add(1)),
        AluOp::Dec => AluResult::Value(a.wrapping_sub(1)),
        AluOp::Cmp => AluResult::Compare(a.cmp(&b).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_wraps() {
        assert_eq!(eval(AluOp::Add, 200, 100), AluResult::Value(44));
        assert_eq!(eval(AluOp::Add, 255, 1), AluResult::Value(0));
    }

    #[test]
    fn test_mul_wraps() {
        assert_eq!(eval(AluOp::Mul, 9, 3), AluResult::Value(27));
        assert_eq!(eval(AluOp::Mul, 16, 16), AluResult::Value(0));
    }

    #[test]
    fn test_inc_dec_wrap() {
        assert_eq!(eval(AluOp::Inc, 255, 0), AluResult::Value(0));
        assert_eq!(eval(AluOp::Dec, 0, 0), AluResult::Value(255));
        assert_eq!(eval(AluOp::Inc, 7, 99), AluResult::Value(8));
        assert_eq!(eval(AluOp::Dec, 7, 99), AluResult::Value(6));
    }

    #[test]
    fn test_cmp_three_way() {
        assert_eq!(eval(AluOp::Cmp, 5, 5), AluResult::Compare(Cond::Equal));
        assert_eq!(eval(AluOp::Cmp, 3, 5), AluResult::Compare(Cond::Less));
        assert_eq!(eval(AluOp::Cmp, 5, 3), AluResult::Compare(Cond::Greater));
        // Unsigned: 0x80 is larger than 0x7F, not negative.
        assert_eq!(
            eval(AluOp::Cmp, 0x80, 0x7F),
            AluResult::Compare(Cond::Greater)
        );
    }

    #[test]
    fn test_add_mul_match_modular_arithmetic() {
        for a in 0..=255u8 {
            for b in 0..=255u8 {
                let sum = ((a as u16 + b as u16) % 256) as u8;
                let product = ((a as u16 * b as u16) % 256) as u8;
                assert_eq!(eval(AluOp::Add, a, b), AluResult::Value(sum));
                assert_eq!(eval(AluOp::Mul, a, b), AluResult::Value(product));
                assert_eq!(
                    eval(AluOp::Cmp, a, b),
                    AluResult::Compare(a.cmp(&b).into())
                );
            }
        }
    }
}
