use crate::bytecode::Program;
use crate::bytecode::op::{Op, PUSH_OPERAND_LEN};

#[derive(Debug, Clone, PartialEq)]
pub struct StackCheckError {
    pub message: String,
}

impl std::fmt::Display for StackCheckError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "stack-check error: {}", self.message)
    }
}

impl std::error::Error for StackCheckError {}

impl StackCheckError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Verifies that a byte stream is well-formed bytecode.
///
/// Walks the instruction stream once, checking that every opcode byte is
/// known, every `PUSH` operand is complete, no arithmetic opcode underflows
/// the operand stack, and the program ends at stack depth exactly one. The
/// compiler asserts this on its own output in debug builds; deserialized
/// images must pass it before the VM will run them.
pub fn check_program(program: &Program) -> Result<(), StackCheckError> {
    let code = program.code();
    let mut pc = 0;
    let mut depth: usize = 0;

    while pc < code.len() {
        let at = pc;
        let op = Op::from_byte(code[pc]).ok_or_else(|| {
            StackCheckError::new(format!("invalid opcode 0x{:02x} at offset {}", code[at], at))
        })?;
        pc += 1;

        match op {
            Op::Push => {
                if code.len() - pc < PUSH_OPERAND_LEN {
                    return Err(StackCheckError::new(format!(
                        "truncated PUSH operand at offset {}",
                        at
                    )));
                }
                pc += PUSH_OPERAND_LEN;
                depth += 1;
            }
            _ => {
                if depth < 2 {
                    return Err(StackCheckError::new(format!(
                        "{} at offset {} underflows the operand stack",
                        op.mnemonic(),
                        at
                    )));
                }
                depth -= 1;
            }
        }
    }

    if depth != 1 {
        return Err(StackCheckError::new(format!(
            "program leaves {} values on the stack, expected 1",
            depth
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::compile;
    use crate::parser::parse;

    fn raw(code: Vec<u8>) -> Program {
        Program::from_code(code)
    }

    #[test]
    fn accepts_compiler_output() {
        let program = compile(&parse("1+2-3*4+(5-6)-(7+8)%9").unwrap());
        assert_eq!(check_program(&program), Ok(()));
    }

    #[test]
    fn rejects_empty_program() {
        let err = check_program(&raw(vec![])).unwrap_err();
        assert!(err.message.contains("leaves 0 values"), "{}", err);
    }

    #[test]
    fn rejects_invalid_opcode() {
        let err = check_program(&raw(vec![0x7f])).unwrap_err();
        assert!(err.message.contains("invalid opcode 0x7f"), "{}", err);
    }

    #[test]
    fn rejects_truncated_push() {
        let err = check_program(&raw(vec![0x00, 1, 2, 3])).unwrap_err();
        assert!(err.message.contains("truncated PUSH"), "{}", err);
    }

    #[test]
    fn rejects_underflow() {
        let mut code = vec![0x00];
        code.extend_from_slice(&1i64.to_le_bytes());
        code.push(0x01); // ADD with one value on the stack
        let err = check_program(&raw(code)).unwrap_err();
        assert!(err.message.contains("underflows"), "{}", err);
    }

    #[test]
    fn rejects_leftover_values() {
        let mut code = Vec::new();
        code.push(0x00);
        code.extend_from_slice(&1i64.to_le_bytes());
        code.push(0x00);
        code.extend_from_slice(&2i64.to_le_bytes());
        let err = check_program(&raw(code)).unwrap_err();
        assert!(err.message.contains("leaves 2 values"), "{}", err);
    }
}
