use crate::ast::Expr;
use crate::bytecode::Program;
use crate::bytecode::op::Op;

/// Compiles an expression tree to a bytecode program.
///
/// One post-order walk: a literal emits `PUSH v`, a binary node compiles its
/// left operand, then its right, then its opcode. The result is the postfix
/// (reverse-Polish) form of the expression, which is exactly what a stack
/// machine consumes left to right. Compilation cannot fail — every tree the
/// parser produces has a bytecode form.
pub fn compile(expr: &Expr) -> Program {
    let mut compiler = Compiler::default();
    compiler.emit_expr(expr);
    let program = Program::from_code(compiler.code);
    debug_assert_eq!(
        crate::bytecode::stack_check::check_program(&program),
        Ok(()),
        "compiler emitted a malformed program"
    );
    program
}

#[derive(Default)]
struct Compiler {
    code: Vec<u8>,
}

impl Compiler {
    fn emit_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Int(value) => self.emit_push(*value),
            Expr::Binary { op, left, right } => {
                self.emit_expr(left);
                self.emit_expr(right);
                self.emit_op(Op::from(*op));
            }
        }
    }

    fn emit_push(&mut self, value: i64) {
        self.code.push(Op::Push as u8);
        self.code.extend_from_slice(&value.to_le_bytes());
    }

    fn emit_op(&mut self, op: Op) {
        self.code.push(op as u8);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn push_bytes(value: i64) -> Vec<u8> {
        let mut bytes = vec![Op::Push as u8];
        bytes.extend_from_slice(&value.to_le_bytes());
        bytes
    }

    #[test]
    fn literal_compiles_to_single_push() {
        let program = compile(&parse("42").unwrap());
        assert_eq!(program.code(), push_bytes(42).as_slice());
    }

    #[test]
    fn binary_node_is_postfix() {
        // 1+2 -> PUSH 1, PUSH 2, ADD
        let program = compile(&parse("1+2").unwrap());
        let mut expected = push_bytes(1);
        expected.extend(push_bytes(2));
        expected.push(Op::Add as u8);
        assert_eq!(program.code(), expected.as_slice());
    }

    #[test]
    fn precedence_shapes_the_postfix_order() {
        // 2+3*4 -> PUSH 2, PUSH 3, PUSH 4, MUL, ADD
        let program = compile(&parse("2+3*4").unwrap());
        let mut expected = push_bytes(2);
        expected.extend(push_bytes(3));
        expected.extend(push_bytes(4));
        expected.push(Op::Mul as u8);
        expected.push(Op::Add as u8);
        assert_eq!(program.code(), expected.as_slice());
    }

    #[test]
    fn operand_is_little_endian() {
        let program = compile(&parse("258").unwrap());
        assert_eq!(&program.code()[1..9], &[2, 1, 0, 0, 0, 0, 0, 0][..]);
    }

    #[test]
    fn compiled_size_is_predictable() {
        // 4 literals and 3 operators: 4 * 9 + 3 bytes.
        let program = compile(&parse("1+2*3-4").unwrap());
        assert_eq!(program.len(), 39);
    }
}
