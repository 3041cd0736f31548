/// Evaluation failures shared by the tree interpreter and the bytecode VM.
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeError {
    /// Divisor of `/` or `%` was zero.
    DivisionByZero,

    /// `i64::MIN / -1` (or the matching `%`), the one quotient that does not
    /// fit in an i64. The hardware divide instruction traps on it, so the
    /// interpreting engines refuse it too instead of wrapping.
    DivisionOverflow,

    /// The VM was handed a byte stream that is not well-formed bytecode:
    /// an unknown opcode, a truncated `PUSH` operand, or a stack effect
    /// that does not end at depth one. Cannot happen for compiler output.
    CorruptProgram(String),
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeError::DivisionByZero => write!(f, "division by zero"),
            RuntimeError::DivisionOverflow => write!(f, "integer overflow in division"),
            RuntimeError::CorruptProgram(msg) => write!(f, "corrupt bytecode: {}", msg),
        }
    }
}

impl std::error::Error for RuntimeError {}
