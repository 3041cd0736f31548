use serde::{Deserialize, Serialize};

use crate::bytecode::stack_check::{StackCheckError, check_program};

/// A compiled bytecode program: one flat instruction stream.
///
/// The byte stream is only ever built by the compiler, so code that got a
/// `Program` through the normal path can trust it is well-formed. Programs
/// that cross a trust boundary — anything deserialized from disk — are
/// validated by [`Program::from_bytes`] before they can reach the VM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    code: Vec<u8>,
}

impl Program {
    pub(crate) fn from_code(code: Vec<u8>) -> Self {
        Program { code }
    }

    pub fn code(&self) -> &[u8] {
        &self.code
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Serializes the program to a postcard image.
    pub fn to_bytes(&self) -> postcard::Result<Vec<u8>> {
        postcard::to_allocvec(self)
    }

    /// Deserializes and validates a postcard image.
    ///
    /// Rejects both images that do not decode and images whose instruction
    /// stream is malformed, so a loaded program carries the same invariant
    /// as a freshly compiled one.
    pub fn from_bytes(bytes: &[u8]) -> Result<Program, StackCheckError> {
        let program: Program = postcard::from_bytes(bytes)
            .map_err(|e| StackCheckError::new(format!("not a bytecode image: {}", e)))?;
        check_program(&program)?;
        Ok(program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::compile;
    use crate::parser::parse;

    #[test]
    fn image_round_trip() {
        let program = compile(&parse("1+2*3").unwrap());
        let bytes = program.to_bytes().unwrap();
        let loaded = Program::from_bytes(&bytes).unwrap();
        assert_eq!(loaded, program);
    }

    #[test]
    fn rejects_garbage_image() {
        assert!(Program::from_bytes(&[0xff, 0xff, 0xff]).is_err());
    }

    #[test]
    fn rejects_malformed_instruction_stream() {
        // A stream that decodes as a Program but underflows the stack.
        let bogus = Program::from_code(vec![0x01]);
        let bytes = bogus.to_bytes().unwrap();
        let err = Program::from_bytes(&bytes).unwrap_err();
        assert!(err.message.contains("underflow"), "{}", err);
    }
}
