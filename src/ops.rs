//! Binary numeric operations over values.

use std::fmt;

use crate::fault::Fault;
use crate::runtime::Runtime;
use crate::value::Handle;

/// A binary arithmetic operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
        };
        f.write_str(symbol)
    }
}

impl Runtime<'_> {
    /// Apply `op` to two Number values, producing a fresh Number owned by
    /// the caller.
    ///
    /// Operands are neither mutated nor consumed; their counts are
    /// untouched. A non-Number operand faults with a type mismatch, and
    /// division by zero faults deterministically — the platform's division
    /// behavior is never reached. Add, Subtract, and Multiply wrap on
    /// overflow.
    pub fn apply(&mut self, op: BinaryOp, lhs: Handle, rhs: Handle) -> Handle {
        let a = self.number_value(lhs);
        let b = self.number_value(rhs);
        let result = match op {
            BinaryOp::Add => a.wrapping_add(b),
            BinaryOp::Subtract => a.wrapping_sub(b),
            BinaryOp::Multiply => a.wrapping_mul(b),
            BinaryOp::Divide => {
                if b == 0 {
                    self.host().raise_fault(Fault::DivisionByZero);
                }
                a.wrapping_div(b)
            }
        };
        tracing::trace!(%op, a, b, result, "number operation");
        self.number(result)
    }
}
