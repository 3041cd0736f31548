use crate::ast::BinOp;

/// Bytecode instructions.
///
/// `Push` is followed in the instruction stream by an 8-byte little-endian
/// operand; the arithmetic opcodes stand alone. The raw stream is not
/// self-describing — decoding an operand as an opcode would read garbage —
/// which is why only the compiler (and validated image loads) produce it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Op {
    Push = 0x00,
    Add = 0x01,
    Sub = 0x02,
    Mul = 0x03,
    Div = 0x04,
    Mod = 0x05,
}

/// Width of a `Push` operand in the instruction stream.
pub const PUSH_OPERAND_LEN: usize = 8;

impl Op {
    pub fn from_byte(byte: u8) -> Option<Op> {
        match byte {
            0x00 => Some(Op::Push),
            0x01 => Some(Op::Add),
            0x02 => Some(Op::Sub),
            0x03 => Some(Op::Mul),
            0x04 => Some(Op::Div),
            0x05 => Some(Op::Mod),
            _ => None,
        }
    }

    /// The arithmetic operator this opcode executes, if it is one.
    pub fn bin_op(self) -> Option<BinOp> {
        match self {
            Op::Push => None,
            Op::Add => Some(BinOp::Add),
            Op::Sub => Some(BinOp::Sub),
            Op::Mul => Some(BinOp::Mul),
            Op::Div => Some(BinOp::Div),
            Op::Mod => Some(BinOp::Mod),
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Op::Push => "PUSH",
            Op::Add => "ADD",
            Op::Sub => "SUB",
            Op::Mul => "MUL",
            Op::Div => "DIV",
            Op::Mod => "MOD",
        }
    }
}

impl From<BinOp> for Op {
    fn from(op: BinOp) -> Op {
        match op {
            BinOp::Add => Op::Add,
            BinOp::Sub => Op::Sub,
            BinOp::Mul => Op::Mul,
            BinOp::Div => Op::Div,
            BinOp::Mod => Op::Mod,
        }
    }
}
