pub mod compile;
pub mod disasm;
pub mod ir;
pub mod op;
pub mod stack_check;

pub use compile::compile;
pub use ir::Program;
pub use op::Op;
