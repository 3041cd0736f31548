pub mod ast;
pub mod bytecode;
pub mod interp;
pub mod jit;
pub mod parser;
pub mod parser_error;
pub mod runtime_error;
pub mod scanner;
pub mod token;
pub mod vm;

pub use parser::{Parser, parse};
pub use scanner::Scanner;
