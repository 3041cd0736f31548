pub mod emitter;
pub mod mem;

use std::io;

use crate::ast::Expr;
use crate::jit::emitter::Asm;
use crate::jit::mem::ExecMem;

/// Failure to set up executable memory for generated code.
#[derive(Debug)]
pub struct JitError {
    pub message: String,
}

impl std::fmt::Display for JitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "jit error: {}", self.message)
    }
}

impl std::error::Error for JitError {}

impl From<io::Error> for JitError {
    fn from(e: io::Error) -> Self {
        JitError {
            message: format!("executable memory unavailable: {}", e),
        }
    }
}

/// An expression compiled to native code.
///
/// Compilation walks the tree in post order, exactly like the bytecode
/// compiler, but emits machine instructions instead of opcodes: a literal
/// becomes a native push, a binary node becomes the operator template from
/// [`emitter::Asm`]. The assembled bytes are copied into an [`ExecMem`]
/// region which is then sealed read+execute; after that the program is pure
/// executable data and every `run` is just a function call.
pub struct JitProgram {
    mem: ExecMem,
    code_len: usize,
}

impl JitProgram {
    pub fn compile(expr: &Expr) -> Result<JitProgram, JitError> {
        let mut asm = Asm::new();
        asm.prologue();
        emit_expr(&mut asm, expr);
        asm.epilogue();
        let code = asm.into_code();

        let mut mem = ExecMem::new(code.len())?;
        mem.slice_mut()[..code.len()].copy_from_slice(&code);
        mem.protect_exec()?;
        Ok(JitProgram {
            mem,
            code_len: code.len(),
        })
    }

    /// Size of the generated code in bytes.
    pub fn code_len(&self) -> usize {
        self.code_len
    }

    /// Invokes the generated code; the result comes back in rax.
    ///
    /// Division or modulo by zero in the expression is a precondition
    /// violation: the generated code executes the hardware divide
    /// instruction unguarded, which traps the process. Callers that cannot
    /// rule it out should evaluate through the interpreter or VM first.
    pub fn run(&self) -> i64 {
        // SAFETY: compile() filled the region with a complete
        // prologue/body/epilogue and sealed it before handing out self.
        let func = unsafe { self.mem.as_fn() };
        unsafe { func() }
    }
}

fn emit_expr(asm: &mut Asm, expr: &Expr) {
    match expr {
        Expr::Int(value) => asm.push_imm(*value),
        Expr::Binary { op, left, right } => {
            emit_expr(asm, left);
            emit_expr(asm, right);
            asm.binary_op(*op);
        }
    }
}
