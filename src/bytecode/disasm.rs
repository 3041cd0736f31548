use std::fmt::Write;

use crate::bytecode::Program;
use crate::bytecode::op::{Op, PUSH_OPERAND_LEN};

/// Renders a human-readable listing of a bytecode program.
///
/// Each line is the instruction's byte offset followed by its mnemonic and,
/// for `PUSH`, the decoded operand. Unknown or truncated bytes are printed
/// as raw `.byte` lines and decoding resumes at the next byte, so the
/// disassembler stays usable on damaged images.
pub fn disassemble(program: &Program) -> String {
    let code = program.code();
    let mut out = String::new();
    let mut pc = 0;

    while pc < code.len() {
        let at = pc;
        match Op::from_byte(code[pc]) {
            Some(Op::Push) if code.len() - pc - 1 >= PUSH_OPERAND_LEN => {
                pc += 1;
                let raw: [u8; PUSH_OPERAND_LEN] = code[pc..pc + PUSH_OPERAND_LEN]
                    .try_into()
                    .expect("operand length checked above");
                pc += PUSH_OPERAND_LEN;
                let _ = writeln!(out, "{:04}  PUSH  {}", at, i64::from_le_bytes(raw));
            }
            Some(Op::Push) | None => {
                pc += 1;
                let _ = writeln!(out, "{:04}  .byte 0x{:02x}", at, code[at]);
            }
            Some(op) => {
                pc += 1;
                let _ = writeln!(out, "{:04}  {}", at, op.mnemonic());
            }
        }
    }
    out
}

/// Prints the disassembly to stdout (`--bc` in the CLI).
pub fn print_bc(program: &Program) {
    print!("{}", disassemble(program));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::compile;
    use crate::parser::parse;

    #[test]
    fn lists_postfix_instructions() {
        let program = compile(&parse("2+3*4").unwrap());
        assert_eq!(
            disassemble(&program),
            "0000  PUSH  2\n\
             0009  PUSH  3\n\
             0018  PUSH  4\n\
             0027  MUL\n\
             0028  ADD\n"
        );
    }

    #[test]
    fn survives_unknown_bytes() {
        let program = Program::from_code(vec![0xab, 0x01]);
        assert_eq!(disassemble(&program), "0000  .byte 0xab\n0001  ADD\n");
    }

    #[test]
    fn survives_truncated_push() {
        let program = Program::from_code(vec![0x00, 0x05]);
        assert_eq!(disassemble(&program), "0000  .byte 0x00\n0001  MOD\n");
    }
}
