use crate::ast::BinOp;

/// x86-64 instruction emitter for the expression stack machine.
///
/// The generated code keeps the whole expression on the native call stack:
/// a literal is a push, a binary operator is one fixed template that loads
/// the two topmost slots into scratch registers, operates, writes the result
/// over the second-from-top slot and discards the top one. rax and rdx are
/// caller-owned scratch; rbx is callee-saved, so the prologue preserves it
/// and the epilogue restores it. The result is returned in rax per the
/// System V calling convention.
///
/// Encodings are x86-64 only, by design. Another target means another
/// emitter, not a parameterization of this one.
pub struct Asm {
    code: Vec<u8>,
}

impl Asm {
    pub fn new() -> Self {
        Asm { code: Vec::new() }
    }

    pub fn code(&self) -> &[u8] {
        &self.code
    }

    pub fn into_code(self) -> Vec<u8> {
        self.code
    }

    fn emit(&mut self, bytes: &[u8]) {
        self.code.extend_from_slice(bytes);
    }

    /// Function entry: save the one callee-saved register the templates use.
    pub fn prologue(&mut self) {
        self.emit(&[0x53]); // push rbx
    }

    /// Pushes an immediate value onto the native stack.
    ///
    /// `push imm32` sign-extends to 64 bits, so it covers any value in i32
    /// range in five bytes; larger literals take the `movabs` form.
    pub fn push_imm(&mut self, value: i64) {
        if let Ok(small) = i32::try_from(value) {
            self.emit(&[0x68]); // push imm32
            self.emit(&small.to_le_bytes());
        } else {
            self.emit(&[0x48, 0xb8]); // movabs rax, imm64
            self.emit(&value.to_le_bytes());
            self.emit(&[0x50]); // push rax
        }
    }

    /// Applies a binary operator to the two topmost native-stack slots.
    ///
    /// Left operand is second from top (pushed first), right operand is on
    /// top; the result replaces the left operand's slot and the top slot is
    /// discarded.
    pub fn binary_op(&mut self, op: BinOp) {
        self.emit(&[0x48, 0x8b, 0x44, 0x24, 0x08]); // mov rax, [rsp+8]
        self.emit(&[0x48, 0x8b, 0x1c, 0x24]); // mov rbx, [rsp]
        match op {
            BinOp::Add => self.emit(&[0x48, 0x03, 0xc3]), // add rax, rbx
            BinOp::Sub => self.emit(&[0x48, 0x2b, 0xc3]), // sub rax, rbx
            BinOp::Mul => self.emit(&[0x48, 0x0f, 0xaf, 0xc3]), // imul rax, rbx
            BinOp::Div | BinOp::Mod => {
                // Widen rax into rdx:rax, then divide. idiv leaves the
                // quotient in rax and the remainder in rdx; `%` just picks
                // the other register. Traps on a zero divisor.
                self.emit(&[0x48, 0x99]); // cqo
                self.emit(&[0x48, 0xf7, 0xfb]); // idiv rbx
                if op == BinOp::Mod {
                    self.emit(&[0x48, 0x8b, 0xc2]); // mov rax, rdx
                }
            }
        }
        self.emit(&[0x48, 0x89, 0x44, 0x24, 0x08]); // mov [rsp+8], rax
        self.emit(&[0x48, 0x83, 0xc4, 0x08]); // add rsp, 8
    }

    /// Function exit: the single remaining slot is the result.
    pub fn epilogue(&mut self) {
        self.emit(&[0x48, 0x8b, 0x04, 0x24]); // mov rax, [rsp]
        self.emit(&[0x48, 0x83, 0xc4, 0x08]); // add rsp, 8
        self.emit(&[0x5b]); // pop rbx
        self.emit(&[0xc3]); // ret
    }
}

impl Default for Asm {
    fn default() -> Self {
        Asm::new()
    }
}
