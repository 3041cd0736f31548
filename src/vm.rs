use crate::bytecode::Program;
use crate::bytecode::op::{Op, PUSH_OPERAND_LEN};
use crate::interp;
use crate::runtime_error::RuntimeError;

/// Stack-based virtual machine for compiled bytecode.
///
/// Runs a program counter over the instruction stream: `PUSH` decodes its
/// inline operand onto the operand stack, each arithmetic opcode pops two
/// values (top is the right operand) and pushes the result. The VM never
/// mutates the program, so re-running the same `Program` is idempotent;
/// the operand stack is reset at the start of every run.
///
/// Programs built by the compiler are well-formed by construction and the
/// VM performs no stack-depth bookkeeping of its own — the structural checks
/// below exist because safe Rust surfaces damage as `CorruptProgram` instead
/// of undefined behavior, not because the VM expects to hit them.
pub struct Vm {
    stack: Vec<i64>,
}

impl Vm {
    pub fn new() -> Self {
        Vm { stack: Vec::new() }
    }

    /// The operand stack; empty between runs.
    pub fn stack(&self) -> &[i64] {
        &self.stack
    }

    /// Executes a program and returns the single value it leaves behind.
    pub fn run(&mut self, program: &Program) -> Result<i64, RuntimeError> {
        self.stack.clear();
        let code = program.code();
        let mut pc = 0;

        while pc < code.len() {
            let at = pc;
            let op = Op::from_byte(code[pc]).ok_or_else(|| {
                RuntimeError::CorruptProgram(format!(
                    "invalid opcode 0x{:02x} at offset {}",
                    code[at], at
                ))
            })?;
            pc += 1;

            match op.bin_op() {
                // PUSH is the only opcode with an inline operand.
                None => {
                    let raw: [u8; PUSH_OPERAND_LEN] = code
                        .get(pc..pc + PUSH_OPERAND_LEN)
                        .and_then(|s| s.try_into().ok())
                        .ok_or_else(|| {
                            RuntimeError::CorruptProgram(format!(
                                "truncated PUSH operand at offset {}",
                                at
                            ))
                        })?;
                    pc += PUSH_OPERAND_LEN;
                    self.stack.push(i64::from_le_bytes(raw));
                }
                Some(bin_op) => {
                    let rhs = self.pop(at)?;
                    let lhs = self.pop(at)?;
                    self.stack.push(interp::apply(bin_op, lhs, rhs)?);
                }
            }
        }

        let result = self.pop(code.len())?;
        if !self.stack.is_empty() {
            return Err(RuntimeError::CorruptProgram(format!(
                "program left {} extra values on the stack",
                self.stack.len()
            )));
        }
        Ok(result)
    }

    fn pop(&mut self, at: usize) -> Result<i64, RuntimeError> {
        self.stack.pop().ok_or_else(|| {
            RuntimeError::CorruptProgram(format!("operand stack underflow at offset {}", at))
        })
    }
}

impl Default for Vm {
    fn default() -> Self {
        Vm::new()
    }
}
