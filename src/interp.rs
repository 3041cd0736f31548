use crate::ast::{BinOp, Expr};
use crate::runtime_error::RuntimeError;

/// Tree-walking evaluator: recursively reduces an expression to its value.
///
/// Pure and re-entrant; evaluating the same tree twice gives the same answer,
/// which the timing harness relies on.
pub fn eval(expr: &Expr) -> Result<i64, RuntimeError> {
    match expr {
        Expr::Int(value) => Ok(*value),
        Expr::Binary { op, left, right } => {
            let lhs = eval(left)?;
            let rhs = eval(right)?;
            apply(*op, lhs, rhs)
        }
    }
}

/// Applies a binary operator with the same semantics the generated machine
/// code has: `+ - *` wrap two's-complement, `/ %` truncate toward zero.
///
/// All three engines funnel through one definition (the JIT by construction,
/// the interpreters by calling it) so they cannot drift apart.
pub(crate) fn apply(op: BinOp, lhs: i64, rhs: i64) -> Result<i64, RuntimeError> {
    match op {
        BinOp::Add => Ok(lhs.wrapping_add(rhs)),
        BinOp::Sub => Ok(lhs.wrapping_sub(rhs)),
        BinOp::Mul => Ok(lhs.wrapping_mul(rhs)),
        BinOp::Div => lhs.checked_div(rhs).ok_or_else(|| div_error(rhs)),
        BinOp::Mod => lhs.checked_rem(rhs).ok_or_else(|| div_error(rhs)),
    }
}

/// `checked_div`/`checked_rem` return `None` in exactly two cases; tell them
/// apart by looking at the divisor.
fn div_error(rhs: i64) -> RuntimeError {
    if rhs == 0 {
        RuntimeError::DivisionByZero
    } else {
        RuntimeError::DivisionOverflow
    }
}
